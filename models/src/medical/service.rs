// models/src/medical/service.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Consultation,
    Diagnostic,
    Pharmacy,
    Optical,
    Surgery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceTier {
    Normal,
    Private,
    Vip,
}

/// Prices in minor currency units, one per service tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSchedule {
    pub normal: i64,
    pub private: i64,
    pub vip: i64,
}

impl PriceSchedule {
    pub fn for_tier(&self, tier: ServiceTier) -> i64 {
        match tier {
            ServiceTier::Normal => self.normal,
            ServiceTier::Private => self.private,
            ServiceTier::Vip => self.vip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub category: ServiceCategory,
    pub price: PriceSchedule,
    pub duration_minutes: u32,
    pub department: String,
    pub description: Option<String>,
    pub requires_payment: bool,
}
