//! Write planning: identity stripping, filename derivation, collision handling.

use std::collections::HashMap;
use std::path::{Component, Path};

use serde_json::Value;
use tracing::warn;

use super::{CollisionPolicy, SplitOptions};
use crate::error::{SyncError, SyncResult};
use crate::types::{normalize_filename, Record};

/// A record ready to be written.
#[derive(Debug, Clone)]
pub struct PlannedWrite {
    /// Output filename (no directory).
    pub filename: String,
    /// Original id, before normalization.
    pub id: String,
    /// Record with the identity field removed.
    pub record: Record,
}

/// A filename shared by more than one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// The shared filename.
    pub filename: String,
    /// Ids that normalized to it, in dump order.
    pub ids: Vec<String>,
}

/// Outcome of planning.
#[derive(Debug, Default)]
pub struct WritePlan {
    /// Records found in the dump.
    pub total: u64,
    /// One entry per distinct filename, in first-seen order.
    pub writes: Vec<PlannedWrite>,
    /// Records dropped by the collision policy.
    pub superseded: u64,
    /// Every filename claimed by more than one record.
    pub collisions: Vec<Collision>,
    /// Records skipped because they were not usable.
    pub errors: Vec<String>,
}

/// Build the write plan for `values`.
///
/// Non-object values, records without a string id and ids whose filename
/// would leave the output directory are skipped and reported. Under [`CollisionPolicy::Fail`] any collision is an error.
pub fn plan_writes(values: Vec<Value>, options: &SplitOptions) -> SyncResult<WritePlan> {
    let mut plan = WritePlan::default();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut collision_slots: HashMap<String, usize> = HashMap::new();

    for (index, value) in values.into_iter().enumerate() {
        plan.total += 1;
        let position = index + 1;

        let Some(mut record) = Record::from_value(value) else {
            let message = format!("Record {position}: not a JSON object");
            warn!("{}", message);
            plan.errors.push(message);
            continue;
        };
        record.strip_field(&options.identity_field);

        let Some(id) = record.id(&options.id_field).map(str::to_string) else {
            let message = format!(
                "Record {position}: missing string field '{}'",
                options.id_field
            );
            warn!("{}", message);
            plan.errors.push(message);
            continue;
        };

        let filename = normalize_filename(&id);
        if !is_plain_filename(&filename) {
            let message = format!(
                "Record {position}: id '{id}' does not name a file inside the output directory"
            );
            warn!("{}", message);
            plan.errors.push(message);
            continue;
        }

        let existing = slots.get(&filename).copied();
        let Some(slot) = existing else {
            slots.insert(filename.clone(), plan.writes.len());
            plan.writes.push(PlannedWrite {
                filename,
                id,
                record,
            });
            continue;
        };

        match collision_slots.get(&filename) {
            Some(&c) => plan.collisions[c].ids.push(id.clone()),
            None => {
                collision_slots.insert(filename.clone(), plan.collisions.len());
                plan.collisions.push(Collision {
                    filename: filename.clone(),
                    ids: vec![plan.writes[slot].id.clone(), id.clone()],
                });
            }
        }

        plan.superseded += 1;
        match options.collision_policy {
            CollisionPolicy::Overwrite => {
                warn!(
                    file = %filename,
                    replaced = %plan.writes[slot].id,
                    by = %id,
                    "Filename collision, keeping later record"
                );
                plan.writes[slot] = PlannedWrite {
                    filename,
                    id,
                    record,
                };
            }
            CollisionPolicy::KeepFirst => {
                warn!(
                    file = %filename,
                    kept = %plan.writes[slot].id,
                    dropped = %id,
                    "Filename collision, keeping earlier record"
                );
            }
            CollisionPolicy::Fail => {
                warn!(file = %filename, id = %id, "Filename collision");
            }
        }
    }

    if options.collision_policy == CollisionPolicy::Fail {
        if let Some(first) = plan.collisions.first() {
            return Err(SyncError::Collision {
                filename: first.filename.clone(),
                ids: first.ids.clone(),
            });
        }
    }

    Ok(plan)
}

/// A filename must be one normal path component, so joining it onto the
/// output directory can never leave that directory.
fn is_plain_filename(filename: &str) -> bool {
    let mut components = Path::new(filename).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(policy: CollisionPolicy) -> SplitOptions {
        SplitOptions {
            collision_policy: policy,
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_strips_identity_field() {
        let values = vec![json!({"_id": {"$oid": "abc"}, "id": "x", "v": 1})];
        let plan = plan_writes(values, &options(CollisionPolicy::Overwrite)).unwrap();

        assert_eq!(plan.writes.len(), 1);
        let written = serde_json::to_value(&plan.writes[0].record).unwrap();
        assert!(written.get("_id").is_none());
        assert_eq!(written["v"], json!(1));
    }

    #[test]
    fn test_plan_skips_unusable_records() {
        let values = vec![
            json!({"id": "ok"}),
            json!(["not", "an", "object"]),
            json!({"name": "no id"}),
            json!({"id": 7}),
        ];
        let plan = plan_writes(values, &options(CollisionPolicy::Overwrite)).unwrap();

        assert_eq!(plan.total, 4);
        assert_eq!(plan.writes.len(), 1);
        assert_eq!(plan.errors.len(), 3);
        assert!(plan.errors[0].contains("Record 2"));
        assert!(plan.errors[1].contains("missing string field 'id'"));
    }

    #[test]
    fn test_plan_rejects_ids_outside_output_dir() {
        let values = vec![
            json!({"id": "/tmp/escape/pwned"}),
            json!({"id": "../up"}),
            json!({"id": "nested/kind"}),
            json!({"id": "..hidden"}),
            json!({"id": "fine"}),
        ];
        let plan = plan_writes(values, &options(CollisionPolicy::Overwrite)).unwrap();

        assert_eq!(plan.total, 5);
        let files: Vec<_> = plan.writes.iter().map(|w| w.filename.as_str()).collect();
        assert_eq!(files, vec!["..hidden.json", "fine.json"]);
        assert_eq!(plan.errors.len(), 3);
        assert!(plan.errors[0].contains("Record 1"));
        assert!(plan.errors[0].contains("/tmp/escape/pwned"));
    }

    #[test]
    fn test_is_plain_filename() {
        assert!(is_plain_filename("stripe.json"));
        assert!(is_plain_filename(".json"));
        assert!(!is_plain_filename("/etc/x.json"));
        assert!(!is_plain_filename("a/b.json"));
        assert!(!is_plain_filename("./a.json"));
    }

    #[test]
    fn test_plan_overwrite_keeps_last() {
        let values = vec![
            json!({"id": "Foo", "v": 1}),
            json!({"id": "foo", "v": 2}),
            json!({"id": "bar", "v": 3}),
        ];
        let plan = plan_writes(values, &options(CollisionPolicy::Overwrite)).unwrap();

        assert_eq!(plan.writes.len(), 2);
        assert_eq!(plan.superseded, 1);
        assert_eq!(plan.writes[0].filename, "foo.json");
        let written = serde_json::to_value(&plan.writes[0].record).unwrap();
        assert_eq!(written["v"], json!(2));
        assert_eq!(
            plan.collisions,
            vec![Collision {
                filename: "foo.json".to_string(),
                ids: vec!["Foo".to_string(), "foo".to_string()],
            }]
        );
    }

    #[test]
    fn test_plan_keep_first() {
        let values = vec![
            json!({"id": "Foo", "v": 1}),
            json!({"id": "foo", "v": 2}),
            json!({"id": "FOO", "v": 3}),
        ];
        let plan = plan_writes(values, &options(CollisionPolicy::KeepFirst)).unwrap();

        assert_eq!(plan.writes.len(), 1);
        assert_eq!(plan.superseded, 2);
        assert_eq!(plan.writes[0].id, "Foo");
        assert_eq!(plan.collisions.len(), 1);
        assert_eq!(plan.collisions[0].ids, vec!["Foo", "foo", "FOO"]);
    }

    #[test]
    fn test_plan_fail_policy() {
        let values = vec![json!({"id": "a b"}), json!({"id": "a_b"})];
        let err = plan_writes(values, &options(CollisionPolicy::Fail)).unwrap_err();

        match err {
            SyncError::Collision { filename, ids } => {
                assert_eq!(filename, "a_b.json");
                assert_eq!(ids, vec!["a b", "a_b"]);
            }
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_fail_policy_without_collisions() {
        let values = vec![json!({"id": "a"}), json!({"id": "b"})];
        let plan = plan_writes(values, &options(CollisionPolicy::Fail)).unwrap();
        assert_eq!(plan.writes.len(), 2);
        assert!(plan.collisions.is_empty());
    }
}
