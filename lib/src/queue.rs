// lib/src/queue.rs

use std::cmp::Reverse;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use log::{debug, info};
use rand::Rng;
use uuid::Uuid;

use crate::config::HospitalConfig;
use models::errors::{HospitalError, HospitalResult};
use models::medical::{
    Department, Priority, QueueEventKind, QueueItem, QueueNotification, QueueStatus,
};
use models::reports::{DepartmentLoad, QueueStats};

/// Presentation-layer side effect for "calling" a patient, injected so
/// the coordinator never touches audio hardware itself.
#[cfg_attr(test, mockall::automock)]
pub trait Announcer: Send + Sync {
    fn announce(&self, text: &str);
}

/// Default announcer: no audio, just a debug line.
#[derive(Debug, Default)]
pub struct SilentAnnouncer;

impl Announcer for SilentAnnouncer {
    fn announce(&self, text: &str) {
        debug!("announcement: {text}");
    }
}

#[derive(Debug, Default)]
struct QueueInner {
    queues: HashMap<Department, Vec<QueueItem>>,
    /// Next number to hand out, per department; counters start at 1.
    next_numbers: HashMap<Department, u32>,
    last_called: HashMap<Department, u32>,
    notifications: VecDeque<QueueNotification>,
    announcements_enabled: bool,
}

/// Priority-ordered waiting lines, one per department.
#[derive(Clone)]
pub struct QueueCoordinator {
    inner: Arc<Mutex<QueueInner>>,
    announcer: Arc<dyn Announcer>,
    wait_minutes_per_patient: u32,
    wait_buffer_minutes: u32,
    min_wait_minutes: u32,
    notification_capacity: usize,
}

impl QueueCoordinator {
    pub fn new(config: &HospitalConfig, announcer: Arc<dyn Announcer>) -> Self {
        let mut inner = QueueInner::default();
        inner.announcements_enabled = true;
        QueueCoordinator {
            inner: Arc::new(Mutex::new(inner)),
            announcer,
            wait_minutes_per_patient: config.wait_minutes_per_patient,
            wait_buffer_minutes: config.wait_buffer_minutes,
            min_wait_minutes: config.min_wait_minutes,
            notification_capacity: config.notification_capacity,
        }
    }

    fn lock(&self) -> HospitalResult<MutexGuard<'_, QueueInner>> {
        self.inner
            .lock()
            .map_err(|e| HospitalError::LockError(e.to_string()))
    }

    fn push_notification(
        inner: &mut QueueInner,
        capacity: usize,
        kind: QueueEventKind,
        message: String,
        queue_item_id: Uuid,
    ) {
        inner.notifications.push_front(QueueNotification {
            id: Uuid::new_v4(),
            kind,
            message,
            queue_item_id,
            timestamp: Utc::now(),
            read: false,
        });
        inner.notifications.truncate(capacity);
    }

    /// Adds a patient to a department line under the next monotonic
    /// queue number. The initial estimate follows the fixed linear
    /// model: `waiting * minutes_per_patient + buffer`.
    pub fn enqueue(
        &self,
        patient_id: Uuid,
        patient_name: &str,
        department: Department,
        service_type: &str,
        priority: Priority,
    ) -> HospitalResult<QueueItem> {
        let mut inner = self.lock()?;
        let number = *inner.next_numbers.entry(department).or_insert(1);
        inner.next_numbers.insert(department, number + 1);

        let waiting = inner
            .queues
            .get(&department)
            .map(|items| {
                items
                    .iter()
                    .filter(|i| i.status == QueueStatus::Waiting)
                    .count() as u32
            })
            .unwrap_or(0);

        let now = Utc::now();
        let item = QueueItem {
            id: Uuid::new_v4(),
            queue_number: number,
            patient_id,
            patient_name: patient_name.to_string(),
            department,
            service_type: service_type.to_string(),
            status: QueueStatus::Waiting,
            priority,
            estimated_wait_minutes: waiting * self.wait_minutes_per_patient
                + self.wait_buffer_minutes,
            actual_wait_minutes: None,
            assigned_to: None,
            notes: None,
            created_at: now,
            called_at: None,
            served_at: None,
            completed_at: None,
            updated_at: now,
        };
        inner
            .queues
            .entry(department)
            .or_default()
            .push(item.clone());

        let kind = if priority == Priority::Emergency {
            QueueEventKind::Urgent
        } else {
            QueueEventKind::Called
        };
        Self::push_notification(
            &mut inner,
            self.notification_capacity,
            kind,
            format!(
                "Patient {} added to {} queue (#{})",
                item.patient_name,
                department.as_str(),
                number
            ),
            item.id,
        );
        info!(
            "enqueued patient {} in {} as #{} ({:?})",
            patient_id,
            department.as_str(),
            number,
            priority
        );
        Ok(item)
    }

    /// Calls the next waiting patient: highest priority first, ties
    /// broken by lowest queue number. An empty line is a normal
    /// outcome, not an error, and mutates nothing.
    pub fn call_next(
        &self,
        department: Department,
        assigned_to: Option<&str>,
    ) -> HospitalResult<Option<QueueItem>> {
        let mut inner = self.lock()?;
        let now = Utc::now();

        let next = inner
            .queues
            .get_mut(&department)
            .and_then(|items| {
                items
                    .iter_mut()
                    .filter(|i| i.status == QueueStatus::Waiting)
                    .min_by_key(|i| (Reverse(i.priority), i.queue_number))
            });
        let Some(item) = next else {
            return Ok(None);
        };

        item.status = QueueStatus::Called;
        item.called_at = Some(now);
        item.actual_wait_minutes =
            Some((now - item.created_at).num_minutes().max(0) as u32);
        item.assigned_to = assigned_to.map(str::to_string);
        item.updated_at = now;
        let called = item.clone();

        inner.last_called.insert(department, called.queue_number);
        Self::push_notification(
            &mut inner,
            self.notification_capacity,
            QueueEventKind::Called,
            format!(
                "Calling {} - Queue #{} to {}",
                called.patient_name,
                called.queue_number,
                department.as_str()
            ),
            called.id,
        );
        let announce = inner.announcements_enabled;
        drop(inner);

        if announce {
            self.announcer.announce(&format!(
                "Queue number {}, {}, please proceed to {}",
                called.queue_number,
                called.patient_name,
                department.as_str()
            ));
        }
        info!(
            "called #{} ({}) in {}",
            called.queue_number,
            called.patient_name,
            department.as_str()
        );
        Ok(Some(called))
    }

    fn find_mut<'a>(
        inner: &'a mut QueueInner,
        id: Uuid,
    ) -> HospitalResult<&'a mut QueueItem> {
        inner
            .queues
            .values_mut()
            .flat_map(|items| items.iter_mut())
            .find(|i| i.id == id)
            .ok_or_else(|| HospitalError::NotFound(format!("queue item {id}")))
    }

    /// `Called -> InService`.
    pub fn begin_service(&self, id: Uuid) -> HospitalResult<QueueItem> {
        let mut inner = self.lock()?;
        let item = Self::find_mut(&mut inner, id)?;
        if item.status != QueueStatus::Called {
            return Err(HospitalError::InvalidTransition {
                from: format!("{:?}", item.status).to_lowercase(),
                to: "in-service".to_string(),
            });
        }
        item.status = QueueStatus::InService;
        item.served_at = Some(Utc::now());
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    /// Terminal transition from `Called` or `InService`.
    pub fn mark_completed(&self, id: Uuid) -> HospitalResult<QueueItem> {
        let mut inner = self.lock()?;
        let item = Self::find_mut(&mut inner, id)?;
        if !matches!(item.status, QueueStatus::Called | QueueStatus::InService) {
            return Err(HospitalError::InvalidTransition {
                from: format!("{:?}", item.status).to_lowercase(),
                to: "completed".to_string(),
            });
        }
        item.status = QueueStatus::Completed;
        item.completed_at = Some(Utc::now());
        item.updated_at = Utc::now();
        let done = item.clone();
        Self::push_notification(
            &mut inner,
            self.notification_capacity,
            QueueEventKind::Completed,
            format!("{} consultation completed", done.patient_name),
            done.id,
        );
        Ok(done)
    }

    /// Absorbing alternative to completion; the item is never again
    /// selectable by `call_next`.
    pub fn mark_no_show(&self, id: Uuid) -> HospitalResult<QueueItem> {
        let mut inner = self.lock()?;
        let item = Self::find_mut(&mut inner, id)?;
        if !matches!(item.status, QueueStatus::Waiting | QueueStatus::Called) {
            return Err(HospitalError::InvalidTransition {
                from: format!("{:?}", item.status).to_lowercase(),
                to: "no-show".to_string(),
            });
        }
        item.status = QueueStatus::NoShow;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    pub fn remove(&self, id: Uuid) -> HospitalResult<()> {
        let mut inner = self.lock()?;
        for items in inner.queues.values_mut() {
            let before = items.len();
            items.retain(|i| i.id != id);
            if items.len() < before {
                return Ok(());
            }
        }
        Err(HospitalError::NotFound(format!("queue item {id}")))
    }

    /// The periodic tick: re-derives each waiting item's estimate from
    /// its position among the other waiting items of its department.
    /// Purely cosmetic; nothing downstream depends on the values.
    pub fn refresh_wait_estimates(&self) -> HospitalResult<()> {
        let mut inner = self.lock()?;
        let mut rng = rand::thread_rng();
        let now = Utc::now();
        for items in inner.queues.values_mut() {
            let waiting_numbers: Vec<u32> = items
                .iter()
                .filter(|i| i.status == QueueStatus::Waiting)
                .map(|i| i.queue_number)
                .collect();
            for item in items
                .iter_mut()
                .filter(|i| i.status == QueueStatus::Waiting)
            {
                let position = waiting_numbers
                    .iter()
                    .filter(|&&n| n < item.queue_number)
                    .count() as u32;
                let jitter = rng.gen_range(0..=self.wait_buffer_minutes);
                item.estimated_wait_minutes = (position * self.wait_minutes_per_patient
                    + jitter)
                    .max(self.min_wait_minutes);
                item.updated_at = now;
            }
        }
        Ok(())
    }

    pub fn items(&self, department: Department) -> HospitalResult<Vec<QueueItem>> {
        let inner = self.lock()?;
        Ok(inner.queues.get(&department).cloned().unwrap_or_default())
    }

    /// 1-based position among the waiting, ordered by queue number.
    /// Zero means the patient is not waiting in that department.
    pub fn patient_position(
        &self,
        patient_id: Uuid,
        department: Department,
    ) -> HospitalResult<usize> {
        let inner = self.lock()?;
        let mut waiting: Vec<&QueueItem> = inner
            .queues
            .get(&department)
            .map(|items| {
                items
                    .iter()
                    .filter(|i| i.status == QueueStatus::Waiting)
                    .collect()
            })
            .unwrap_or_default();
        waiting.sort_by_key(|i| i.queue_number);
        Ok(waiting
            .iter()
            .position(|i| i.patient_id == patient_id)
            .map(|p| p + 1)
            .unwrap_or(0))
    }

    pub fn estimated_wait_for(
        &self,
        patient_id: Uuid,
        department: Department,
    ) -> HospitalResult<u32> {
        let position = self.patient_position(patient_id, department)?;
        if position == 0 {
            return Ok(0);
        }
        let inner = self.lock()?;
        let in_service = inner
            .queues
            .get(&department)
            .map(|items| {
                items
                    .iter()
                    .filter(|i| {
                        matches!(i.status, QueueStatus::Called | QueueStatus::InService)
                    })
                    .count()
            })
            .unwrap_or(0);
        Ok((position + in_service - 1) as u32 * self.wait_minutes_per_patient)
    }

    pub fn stats(&self, department: Option<Department>) -> HospitalResult<QueueStats> {
        let inner = self.lock()?;
        let now = Utc::now();
        let items: Vec<&QueueItem> = match department {
            Some(d) => inner
                .queues
                .get(&d)
                .map(|items| items.iter().collect())
                .unwrap_or_default(),
            None => inner.queues.values().flatten().collect(),
        };

        let waiting: Vec<&&QueueItem> = items
            .iter()
            .filter(|i| i.status == QueueStatus::Waiting)
            .collect();
        let in_service = items
            .iter()
            .filter(|i| matches!(i.status, QueueStatus::Called | QueueStatus::InService))
            .count();
        let completed: Vec<&&QueueItem> = items
            .iter()
            .filter(|i| i.status == QueueStatus::Completed)
            .collect();

        let observed: Vec<u32> = completed
            .iter()
            .filter_map(|i| i.actual_wait_minutes)
            .collect();
        let average_wait_minutes = if observed.is_empty() {
            0
        } else {
            observed.iter().sum::<u32>() / observed.len() as u32
        };
        let longest_wait_minutes = waiting
            .iter()
            .map(|i| (now - i.created_at).num_minutes().max(0) as u32)
            .max()
            .unwrap_or(0);

        Ok(QueueStats {
            total_waiting: waiting.len(),
            total_in_service: in_service,
            total_completed: completed.len(),
            average_wait_minutes,
            longest_wait_minutes,
        })
    }

    /// Display-board snapshot of every department line.
    pub fn department_loads(&self) -> HospitalResult<Vec<DepartmentLoad>> {
        let inner = self.lock()?;
        Ok(Department::ALL
            .iter()
            .map(|&department| {
                let items = inner.queues.get(&department);
                let count = |predicate: fn(&QueueStatus) -> bool| {
                    items
                        .map(|items| {
                            items.iter().filter(|i| predicate(&i.status)).count()
                        })
                        .unwrap_or(0)
                };
                DepartmentLoad {
                    department,
                    waiting: count(|s| *s == QueueStatus::Waiting),
                    in_service: count(|s| {
                        matches!(s, QueueStatus::Called | QueueStatus::InService)
                    }),
                    current_number: inner
                        .next_numbers
                        .get(&department)
                        .copied()
                        .unwrap_or(1),
                    last_called_number: inner
                        .last_called
                        .get(&department)
                        .copied()
                        .unwrap_or(0),
                }
            })
            .collect())
    }

    pub fn notifications(&self) -> HospitalResult<Vec<QueueNotification>> {
        let inner = self.lock()?;
        Ok(inner.notifications.iter().cloned().collect())
    }

    pub fn mark_notification_read(&self, id: Uuid) -> HospitalResult<()> {
        let mut inner = self.lock()?;
        let notification = inner
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| HospitalError::NotFound(format!("notification {id}")))?;
        notification.read = true;
        Ok(())
    }

    pub fn clear_notifications(&self) -> HospitalResult<()> {
        let mut inner = self.lock()?;
        inner.notifications.clear();
        Ok(())
    }

    pub fn set_announcements_enabled(&self, enabled: bool) -> HospitalResult<()> {
        let mut inner = self.lock()?;
        inner.announcements_enabled = enabled;
        Ok(())
    }

    pub(crate) fn export(&self) -> HospitalResult<Vec<QueueItem>> {
        let inner = self.lock()?;
        Ok(inner.queues.values().flatten().cloned().collect())
    }

    pub(crate) fn import(&self, items: Vec<QueueItem>) -> HospitalResult<()> {
        let mut inner = self.lock()?;
        inner.queues.clear();
        inner.next_numbers.clear();
        for item in items {
            let next = inner.next_numbers.entry(item.department).or_insert(1);
            *next = (*next).max(item.queue_number + 1);
            inner.queues.entry(item.department).or_default().push(item);
        }
        Ok(())
    }
}
