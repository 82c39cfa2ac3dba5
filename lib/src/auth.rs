// lib/src/auth.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use log::{info, warn};
use once_cell::sync::Lazy;
use uuid::Uuid;

use models::errors::{HospitalError, HospitalResult};
use models::medical::{Role, User};

pub const PERM_ALL: &str = "*";
pub const PERM_PATIENTS_READ: &str = "patients.read";
pub const PERM_PATIENTS_WRITE: &str = "patients.write";
pub const PERM_CONSULTATIONS_READ: &str = "consultations.read";
pub const PERM_CONSULTATIONS_WRITE: &str = "consultations.write";
pub const PERM_PRESCRIPTIONS_READ: &str = "prescriptions.read";
pub const PERM_PRESCRIPTIONS_WRITE: &str = "prescriptions.write";
pub const PERM_DISPENSING_READ: &str = "dispensing.read";
pub const PERM_DISPENSING_WRITE: &str = "dispensing.write";
pub const PERM_PAYMENTS_READ: &str = "payments.read";
pub const PERM_PAYMENTS_WRITE: &str = "payments.write";
pub const PERM_BILLING_READ: &str = "billing.read";
pub const PERM_BILLING_WRITE: &str = "billing.write";
pub const PERM_QUEUE_READ: &str = "queue.read";
pub const PERM_QUEUE_WRITE: &str = "queue.write";
pub const PERM_VITALS_READ: &str = "vitals.read";
pub const PERM_VITALS_WRITE: &str = "vitals.write";
pub const PERM_SCREENING_READ: &str = "screening.read";
pub const PERM_SCREENING_WRITE: &str = "screening.write";
pub const PERM_REPORTS_READ: &str = "reports.read";

/// Authorization by enumeration: each role maps to a fixed permission
/// list, admin to the wildcard.
static ROLE_PERMISSIONS: Lazy<HashMap<Role, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        (Role::Admin, vec![PERM_ALL]),
        (
            Role::Doctor,
            vec![
                PERM_PATIENTS_READ,
                PERM_PATIENTS_WRITE,
                PERM_CONSULTATIONS_READ,
                PERM_CONSULTATIONS_WRITE,
                PERM_PRESCRIPTIONS_READ,
                PERM_PRESCRIPTIONS_WRITE,
                PERM_VITALS_READ,
                PERM_SCREENING_READ,
                PERM_QUEUE_READ,
                PERM_REPORTS_READ,
            ],
        ),
        (
            Role::Nurse,
            vec![
                PERM_PATIENTS_READ,
                PERM_PATIENTS_WRITE,
                PERM_VITALS_READ,
                PERM_VITALS_WRITE,
                PERM_SCREENING_READ,
                PERM_SCREENING_WRITE,
                PERM_QUEUE_READ,
                PERM_QUEUE_WRITE,
            ],
        ),
        (
            Role::Receptionist,
            vec![
                PERM_PATIENTS_READ,
                PERM_PATIENTS_WRITE,
                PERM_QUEUE_READ,
                PERM_QUEUE_WRITE,
            ],
        ),
        (
            Role::Pharmacist,
            vec![
                PERM_PRESCRIPTIONS_READ,
                PERM_DISPENSING_READ,
                PERM_DISPENSING_WRITE,
                PERM_PATIENTS_READ,
            ],
        ),
        (
            Role::Cashier,
            vec![
                PERM_PAYMENTS_READ,
                PERM_PAYMENTS_WRITE,
                PERM_BILLING_READ,
                PERM_BILLING_WRITE,
                PERM_PATIENTS_READ,
            ],
        ),
    ])
});

/// Per-role allowed routes; admin sees everything.
static ROLE_ROUTES: Lazy<HashMap<Role, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        (
            Role::Admin,
            vec![
                "/",
                "/admin",
                "/reception",
                "/screening",
                "/doctor",
                "/pharmacy",
                "/cashier",
                "/queue",
                "/reports",
            ],
        ),
        (Role::Doctor, vec!["/", "/doctor", "/screening"]),
        (Role::Nurse, vec!["/", "/screening", "/reception"]),
        (Role::Receptionist, vec!["/", "/reception"]),
        (Role::Pharmacist, vec!["/", "/pharmacy"]),
        (Role::Cashier, vec!["/", "/cashier"]),
    ])
});

pub fn permissions_for(role: Role) -> Vec<String> {
    ROLE_PERMISSIONS
        .get(&role)
        .map(|perms| perms.iter().map(|p| p.to_string()).collect())
        .unwrap_or_default()
}

/// The `*` wildcard grants every permission.
pub fn has_permission(granted: &[String], permission: &str) -> bool {
    granted.iter().any(|p| p == PERM_ALL || p == permission)
}

pub fn role_has_permission(role: Role, permission: &str) -> bool {
    ROLE_PERMISSIONS
        .get(&role)
        .map(|perms| perms.iter().any(|p| *p == PERM_ALL || *p == permission))
        .unwrap_or(false)
}

/// Pure route gate backed by the static table.
pub fn route_allowed(role: Role, route: &str) -> bool {
    ROLE_ROUTES
        .get(&role)
        .map(|routes| routes.iter().any(|r| *r == route))
        .unwrap_or(false)
}

pub fn is_admin(role: Role) -> bool {
    role == Role::Admin
}

struct AuthInner {
    users: HashMap<String, User>,
}

/// Demo credential check. Accounts live in memory with bcrypt hashes;
/// this is a stand-in, not a credential store.
#[derive(Clone)]
pub struct AuthService {
    inner: Arc<Mutex<AuthInner>>,
    login_delay: Duration,
}

impl AuthService {
    pub fn new(login_delay: Duration) -> Self {
        AuthService {
            inner: Arc::new(Mutex::new(AuthInner {
                users: HashMap::new(),
            })),
            login_delay,
        }
    }

    fn lock(&self) -> HospitalResult<MutexGuard<'_, AuthInner>> {
        self.inner
            .lock()
            .map_err(|e| HospitalError::LockError(e.to_string()))
    }

    /// Creates an account with the role's permission set from the
    /// static table.
    pub fn add_user(
        &self,
        username: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        role: Role,
        department: &str,
    ) -> HospitalResult<User> {
        let mut inner = self.lock()?;
        if inner.users.contains_key(username) {
            return Err(HospitalError::AlreadyExists(format!("user {username}")));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role,
            department: department.to_string(),
            permissions: permissions_for(role),
            is_active: true,
            password_hash: User::hash_password(password)?,
            last_login: None,
            created_at: Utc::now(),
        };
        inner.users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    pub fn deactivate(&self, username: &str) -> HospitalResult<()> {
        let mut inner = self.lock()?;
        let user = inner
            .users
            .get_mut(username)
            .ok_or_else(|| HospitalError::NotFound(format!("user {username}")))?;
        user.is_active = false;
        Ok(())
    }

    /// Validates demo credentials after the simulated round-trip
    /// delay. Unknown users, wrong passwords and deactivated accounts
    /// all fail with the same error.
    pub async fn login(&self, username: &str, password: &str) -> HospitalResult<User> {
        tokio::time::sleep(self.login_delay).await;

        let mut inner = self.lock()?;
        let denied = || HospitalError::AuthenticationError("invalid credentials".to_string());
        let user = inner.users.get_mut(username).ok_or_else(denied)?;
        if !user.is_active || !user.verify_password(password)? {
            warn!("failed login attempt for {username}");
            return Err(denied());
        }
        user.last_login = Some(Utc::now());
        info!("{} logged in as {:?}", username, user.role);
        Ok(user.clone())
    }

    /// Sessions live entirely with the caller; logout is bookkeeping.
    pub fn logout(&self, username: &str) -> HospitalResult<()> {
        let inner = self.lock()?;
        if !inner.users.contains_key(username) {
            return Err(HospitalError::NotFound(format!("user {username}")));
        }
        info!("{username} logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_wildcard_grants_everything() {
        assert!(role_has_permission(Role::Admin, PERM_DISPENSING_WRITE));
        assert!(has_permission(&[PERM_ALL.to_string()], "anything.at.all"));
        assert!(is_admin(Role::Admin));
        assert!(!is_admin(Role::Doctor));
    }

    #[test]
    fn roles_see_only_their_fixed_route_subset() {
        assert!(route_allowed(Role::Admin, "/pharmacy"));
        assert!(route_allowed(Role::Pharmacist, "/pharmacy"));
        assert!(!route_allowed(Role::Pharmacist, "/cashier"));
        assert!(!route_allowed(Role::Cashier, "/pharmacy"));
        assert!(route_allowed(Role::Cashier, "/"));
        assert!(!route_allowed(Role::Receptionist, "/doctor"));
    }

    #[test]
    fn cashiers_cannot_dispense_and_pharmacists_cannot_bill() {
        assert!(role_has_permission(Role::Cashier, PERM_BILLING_WRITE));
        assert!(!role_has_permission(Role::Cashier, PERM_DISPENSING_WRITE));
        assert!(role_has_permission(Role::Pharmacist, PERM_DISPENSING_WRITE));
        assert!(!role_has_permission(Role::Pharmacist, PERM_BILLING_WRITE));
    }

    #[tokio::test]
    async fn login_accepts_valid_demo_credentials_only() {
        let auth = AuthService::new(Duration::from_millis(1));
        auth.add_user(
            "pharm1",
            "demo1234",
            "Pharmacy",
            "One",
            Role::Pharmacist,
            "Pharmacy",
        )
        .unwrap();

        let user = auth.login("pharm1", "demo1234").await.unwrap();
        assert_eq!(user.role, Role::Pharmacist);
        assert!(user.last_login.is_some());
        assert!(has_permission(&user.permissions, PERM_DISPENSING_WRITE));

        assert!(matches!(
            auth.login("pharm1", "wrong").await,
            Err(HospitalError::AuthenticationError(_))
        ));
        assert!(matches!(
            auth.login("ghost", "demo1234").await,
            Err(HospitalError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn deactivated_accounts_cannot_log_in() {
        let auth = AuthService::new(Duration::from_millis(1));
        auth.add_user("cash1", "demo1234", "Cash", "One", Role::Cashier, "Billing")
            .unwrap();
        auth.deactivate("cash1").unwrap();
        assert!(matches!(
            auth.login("cash1", "demo1234").await,
            Err(HospitalError::AuthenticationError(_))
        ));
    }
}
