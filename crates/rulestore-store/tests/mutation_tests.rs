// Integration tests for single and batch rule mutations

mod common;

use common::{fields, memory_adapter, rules, stored_lines};
use rulestore_core::{Adapter, ExErrorKind};
use rulestore_store::{encode, Column};

#[test]
fn test_add_then_remove_is_net_no_op() {
    // Given: An adapter holding one unrelated rule
    let mut adapter = memory_adapter();
    adapter
        .add_policy("g", "g", &fields(&["user_1", "role_1"]))
        .unwrap();
    let before = stored_lines(&adapter);

    // When: A rule is added and then removed with identical fields
    let rule = fields(&["alice", "data1", "read"]);
    adapter.add_policy("p", "p", &rule).unwrap();
    let removed = adapter.remove_policy("p", "p", &rule).unwrap();

    // Then: The table is back in its prior state
    assert_eq!(removed, 1);
    assert_eq!(stored_lines(&adapter), before);
}

#[test]
fn test_add_one_stores_duplicates() {
    let mut adapter = memory_adapter();
    let rule = fields(&["alice", "data1", "read"]);

    adapter.add_policy("p", "p", &rule).unwrap();
    adapter.add_policy("p", "p", &rule).unwrap();

    assert_eq!(adapter.rows().unwrap().len(), 2);
    assert_eq!(adapter.remove_policy("p", "p", &rule).unwrap(), 2);
}

#[test]
fn test_add_many_inserts_every_rule() {
    let mut adapter = memory_adapter();

    adapter
        .add_policies("p", "p", &rules(&[&["a", "r1"], &["b", "r2"], &["c"]]))
        .unwrap();
    adapter.add_policies("p", "p", &[]).unwrap();

    assert_eq!(stored_lines(&adapter), ["p, a, r1", "p, b, r2", "p, c"]);
}

#[test]
fn test_add_many_crosses_insert_batch_boundary() {
    let mut adapter = memory_adapter();
    let many: Vec<Vec<String>> = (0..5000).map(|i| vec![format!("user_{i}")]).collect();

    adapter.add_policies("p", "p", &many).unwrap();

    assert_eq!(adapter.rows().unwrap().len(), 5000);
}

#[test]
fn test_add_many_is_one_failure_unit_across_batches() {
    // Given: A trigger rejecting one value and a batch spanning two inserts
    let mut adapter = memory_adapter();
    adapter
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_bad BEFORE INSERT ON casbin_policy \
             WHEN NEW.v0 = 'bad' \
             BEGIN SELECT RAISE(ABORT, 'bad value'); END;",
        )
        .unwrap();
    let mut many: Vec<Vec<String>> = (0..5000).map(|i| vec![format!("user_{i}")]).collect();
    many[4500] = fields(&["bad"]);

    // When: The rejected rule sits in the second insert
    let err = adapter.add_policies("p", "p", &many).unwrap_err();

    // Then: The first insert is undone as well
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.op(), Some("add_policies"));
    assert!(adapter.rows().unwrap().is_empty());

    // And: The connection is usable for the next mutation
    adapter.add_policy("p", "p", &fields(&["alice"])).unwrap();
    assert_eq!(stored_lines(&adapter), ["p, alice"]);
}

#[test]
fn test_remove_one_treats_empty_fields_as_wildcards() {
    // Given: Two rules differing only in v1
    let mut adapter = memory_adapter();
    adapter
        .add_policies("p", "p", &rules(&[&["alice", "data1", "read"], &["alice", "data2", "read"]]))
        .unwrap();

    // When: Removing with an empty v1
    let removed = adapter
        .remove_policy("p", "p", &fields(&["alice", "", "read"]))
        .unwrap();

    // Then: Both rows match
    assert_eq!(removed, 2);
    assert!(adapter.rows().unwrap().is_empty());
}

#[test]
fn test_remove_filtered_matches_window_only() {
    // Given: Rows with and without v2 = "x", plus a grouping row with v2 = "x"
    let mut adapter = memory_adapter();
    adapter
        .add_policies(
            "p",
            "p",
            &rules(&[
                &["a", "b", "x"],
                &["c", "d", "x", "e"],
                &["a", "b", "y"],
            ]),
        )
        .unwrap();
    adapter.add_policy("g", "g", &fields(&["a", "b", "x"])).unwrap();

    // When: Filtering on index 2
    let removed = adapter
        .remove_filtered_policy("p", "p", 2, &fields(&["x"]))
        .unwrap();

    // Then: Exactly the p rows with v2 = "x" are gone
    assert_eq!(removed, 2);
    assert_eq!(stored_lines(&adapter), ["g, a, b, x", "p, a, b, y"]);
}

#[test]
fn test_remove_filtered_empty_value_is_unconstrained() {
    let mut adapter = memory_adapter();
    adapter
        .add_policies("p", "p", &rules(&[&["alice", "data1"], &["alice", "data2"], &["bob", "data1"]]))
        .unwrap();

    let removed = adapter
        .remove_filtered_policy("p", "p", 0, &fields(&["alice", ""]))
        .unwrap();

    assert_eq!(removed, 2);
    assert_eq!(stored_lines(&adapter), ["p, bob, data1"]);
}

#[test]
fn test_remove_filtered_window_past_last_column() {
    let mut adapter = memory_adapter();
    adapter.add_policy("p", "p", &fields(&["alice"])).unwrap();

    // Values beyond v5 have no column to constrain; only ptype remains
    let removed = adapter
        .remove_filtered_policy("p", "p", 6, &fields(&["ignored"]))
        .unwrap();

    assert_eq!(removed, 1);
}

#[test]
fn test_remove_many_constrains_only_present_columns() {
    // Given: Rows exercising both branches and their edges
    let mut adapter = memory_adapter();
    adapter
        .add_policies(
            "p",
            "p",
            &rules(&[&["a", "b"], &["a", "b", "z"], &["c"], &["c", "d"], &["a"]]),
        )
        .unwrap();

    // When: Removing [[a, b], [c]]
    let removed = adapter
        .remove_policies("p", "p", &rules(&[&["a", "b"], &["c"]]))
        .unwrap();

    // Then: (v0=a AND v1=b) OR (v0=c); the second rule does not constrain v1
    assert_eq!(removed, 4);
    assert_eq!(stored_lines(&adapter), ["p, a"]);
}

#[test]
fn test_remove_many_empty_value_is_constrained() {
    let mut adapter = memory_adapter();
    adapter
        .add_policies("p", "p", &rules(&[&["a", "", "r"], &["a", "b", "r"]]))
        .unwrap();

    // Unlike remove_policy, an empty value inside the rule must equal ""
    let removed = adapter
        .remove_policies("p", "p", &rules(&[&["a", ""]]))
        .unwrap();

    assert_eq!(removed, 1);
    assert_eq!(adapter.rows().unwrap()[0], encode("p", &["a", "b", "r"]));
}

#[test]
fn test_remove_many_empty_list_deletes_nothing() {
    let mut adapter = memory_adapter();
    adapter.add_policy("p", "p", &fields(&["a"])).unwrap();

    assert_eq!(adapter.remove_policies("p", "p", &[]).unwrap(), 0);
    assert_eq!(adapter.rows().unwrap().len(), 1);
}

#[test]
fn test_update_one_requires_exact_match() {
    // Given: A rule and a longer rule sharing its prefix
    let mut adapter = memory_adapter();
    adapter
        .add_policies("p", "p", &rules(&[&["alice", "data1"], &["alice", "data1", "read"]]))
        .unwrap();

    // When: Updating the shorter rule
    let updated = adapter
        .update_policy("p", "p", &fields(&["alice", "data1"]), &fields(&["bob", "data2"]))
        .unwrap();

    // Then: Only the exact row changed
    assert_eq!(updated, 1);
    assert_eq!(stored_lines(&adapter), ["p, alice, data1, read", "p, bob, data2"]);
}

#[test]
fn test_update_one_clears_trailing_columns() {
    let mut adapter = memory_adapter();
    adapter
        .add_policy("p", "p", &fields(&["alice", "data1", "read"]))
        .unwrap();

    adapter
        .update_policy("p", "p", &fields(&["alice", "data1", "read"]), &fields(&["bob"]))
        .unwrap();

    let row = &adapter.rows().unwrap()[0];
    assert_eq!(row.get(Column::V0), "bob");
    assert_eq!(row.get(Column::V1), "");
    assert_eq!(row.get(Column::V2), "");
}

#[test]
fn test_update_many_truncates_to_shorter_list() {
    // Given: Three stored rules
    let mut adapter = memory_adapter();
    adapter
        .add_policies("p", "p", &rules(&[&["a"], &["b"], &["c"]]))
        .unwrap();

    // When: Three olds are paired with two news, the second old matching nothing
    let olds = rules(&[&["a"], &["missing"], &["c"]]);
    let news = rules(&[&["a2"], &["b2"]]);
    let updated = adapter.update_policies("p", "p", &olds, &news).unwrap();

    // Then: Both pairs commit and the third old rule is ignored
    assert_eq!(updated, 1);
    assert_eq!(stored_lines(&adapter), ["p, a2", "p, b", "p, c"]);
}

#[test]
fn test_update_many_applies_old_to_new() {
    let mut adapter = memory_adapter();
    adapter
        .add_policies("g", "g", &rules(&[&["u1", "r1"], &["u2", "r1"]]))
        .unwrap();

    let updated = adapter
        .update_policies(
            "g",
            "g",
            &rules(&[&["u1", "r1"], &["u2", "r1"]]),
            &rules(&[&["u1", "r2"], &["u2", "r2"]]),
        )
        .unwrap();

    assert_eq!(updated, 2);
    assert_eq!(stored_lines(&adapter), ["g, u1, r2", "g, u2, r2"]);
}

#[test]
fn test_update_many_empty_list_is_no_op() {
    let mut adapter = memory_adapter();
    adapter.add_policy("p", "p", &fields(&["a"])).unwrap();

    assert_eq!(adapter.update_policies("p", "p", &rules(&[&["a"]]), &[]).unwrap(), 0);
    assert_eq!(adapter.update_policies("p", "p", &[], &rules(&[&["b"]])).unwrap(), 0);
    assert_eq!(stored_lines(&adapter), ["p, a"]);
}

#[test]
fn test_update_many_rolls_back_on_failure() {
    // Given: Two rules and a trigger rejecting one target value
    let mut adapter = memory_adapter();
    adapter
        .add_policies("p", "p", &rules(&[&["a"], &["b"]]))
        .unwrap();
    adapter
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_forbidden BEFORE UPDATE ON casbin_policy \
             WHEN NEW.v0 = 'forbidden' \
             BEGIN SELECT RAISE(ABORT, 'forbidden value'); END;",
        )
        .unwrap();

    // When: The second pair of the batch fails
    let err = adapter
        .update_policies(
            "p",
            "p",
            &rules(&[&["a"], &["b"]]),
            &rules(&[&["a2"], &["forbidden"]]),
        )
        .unwrap_err();

    // Then: The error is the backend's and the first pair was rolled back
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.op(), Some("update_policies"));
    assert!(err.message().contains("forbidden value"));
    assert_eq!(stored_lines(&adapter), ["p, a", "p, b"]);
}

#[test]
fn test_hostile_values_are_stored_verbatim() {
    let mut adapter = memory_adapter();
    let hostile = fields(&["x' OR '1'='1", "\"; DROP TABLE casbin_policy; --"]);

    adapter.add_policy("p", "p", &hostile).unwrap();
    assert_eq!(adapter.remove_policy("p", "p", &fields(&["nobody"])).unwrap(), 0);

    let row = &adapter.rows().unwrap()[0];
    assert_eq!(row.get(Column::V0), hostile[0]);
    assert_eq!(row.get(Column::V1), hostile[1]);
}

#[test]
fn test_section_does_not_partition_storage() {
    let mut adapter = memory_adapter();
    adapter.add_policy("p", "p", &fields(&["a"])).unwrap();

    // Rows are keyed by ptype alone
    assert_eq!(adapter.remove_policy("g", "p", &fields(&["a"])).unwrap(), 1);
}
