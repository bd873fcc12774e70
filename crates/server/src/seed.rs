//! Optional seed-file loading. Nothing is embedded in the binary; `serve`
//! and `ls` take a JSON file with one array per kind, and records with a
//! nil uid get one assigned at load.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;
use voltdesk_core::entities::{
    Component, DiePlan, HsrpRequest, RsaRequest, SparePartRequest, User, Vendor,
};
use voltdesk_core::{Entity, Mutation, Uid};
use voltdesk_store::SharedCollection;

use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub vendors: Vec<Vendor>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, rename = "die-plans")]
    pub die_plans: Vec<DiePlan>,
    #[serde(default, rename = "spare-part-requests")]
    pub spare_part_requests: Vec<SparePartRequest>,
    #[serde(default, rename = "hsrp-requests")]
    pub hsrp_requests: Vec<HsrpRequest>,
    #[serde(default, rename = "rsa-requests")]
    pub rsa_requests: Vec<RsaRequest>,
    #[serde(default)]
    pub users: Vec<User>,
}

impl SeedFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path).with_context(|| format!("opening seed file {}", path.display()))?;
        let seed: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing seed file {}", path.display()))?;
        Ok(seed)
    }

    pub fn len(&self) -> usize {
        self.vendors.len()
            + self.components.len()
            + self.die_plans.len()
            + self.spare_part_requests.len()
            + self.hsrp_requests.len()
            + self.rsa_requests.len()
            + self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load every kind into its collection, one batch (one epoch) per kind.
    pub fn apply(self, state: &AppState) {
        let total = self.len();
        seed_into(self.vendors, &state.vendors);
        seed_into(self.components, &state.components);
        seed_into(self.die_plans, &state.die_plans);
        seed_into(self.spare_part_requests, &state.spare_part_requests);
        seed_into(self.hsrp_requests, &state.hsrp_requests);
        seed_into(self.rsa_requests, &state.rsa_requests);
        seed_into(self.users, &state.users);
        info!(records = total, "seed applied");
    }
}

fn seed_into<T: Entity>(records: Vec<T>, col: &SharedCollection<T>) {
    if records.is_empty() {
        return;
    }
    let batch: Vec<Mutation<T>> = records
        .into_iter()
        .map(|mut rec| {
            if rec.uid().is_nil() {
                rec.set_uid(Uid::new());
            }
            Mutation::Upsert(rec)
        })
        .collect();
    col.apply(batch);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_parses_kind_arrays_and_assigns_uids() {
        let seed: SeedFile = serde_json::from_str(
            r#"{
                "vendors": [
                    {
                        "name": "Shakti Auto Castings",
                        "city": "Pune",
                        "category": "Castings",
                        "status": "Active",
                        "rating": 4.2,
                        "onboarded_on": "2023-06-15"
                    }
                ],
                "users": [
                    {
                        "username": "priya.ops",
                        "full_name": "Priya Kulkarni",
                        "role": "admin",
                        "email": "priya@example.test",
                        "status": "Active"
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(seed.len(), 2);

        let state = AppState::new();
        seed.apply(&state);
        let vendors = state.vendors.current();
        assert_eq!(vendors.items.len(), 1);
        assert!(!vendors.items[0].uid.is_nil());
        assert_eq!(state.users.current().items.len(), 1);
        assert!(state.components.current().items.is_empty());
    }

    #[test]
    fn missing_kinds_default_to_empty() {
        let seed: SeedFile = serde_json::from_str("{}").unwrap();
        assert!(seed.is_empty());
    }
}
