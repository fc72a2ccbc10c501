#![allow(clippy::float_cmp)]

use super::*;

fn row(id: RowId, items: &[&str]) -> Row {
    Row::new(id, items.iter().map(ToString::to_string).collect())
}

fn sample() -> Template {
    Template::from_rows(vec![row(1, &["A", "B"]), row(2, &["C"]), row(3, &[])]).unwrap()
}

// =============================================================
// Alignment
// =============================================================

#[test]
fn alignment_default_is_left() {
    assert_eq!(Alignment::default(), Alignment::Left);
}

#[test]
fn alignment_serde_lowercase() {
    for (alignment, expected) in [
        (Alignment::Left, "\"left\""),
        (Alignment::Center, "\"center\""),
        (Alignment::Right, "\"right\""),
    ] {
        assert_eq!(serde_json::to_string(&alignment).unwrap(), expected);
        assert_eq!(serde_json::from_str::<Alignment>(expected).unwrap(), alignment);
    }
}

#[test]
fn alignment_labels() {
    assert_eq!(Alignment::Left.label(), "Aligned left");
    assert_eq!(Alignment::Center.label(), "Centered");
    assert_eq!(Alignment::Right.label(), "Aligned right");
}

// =============================================================
// Row
// =============================================================

#[test]
fn row_capacity() {
    assert!(!row(1, &["A", "B"]).is_full());
    assert!(row(1, &["A", "B", "C"]).is_full());
    assert_eq!(row(1, &["A"]).remaining_capacity(), 2);
}

#[test]
fn row_deserializes_with_defaults() {
    let r: Row = serde_json::from_str(r#"{ "id": 4 }"#).unwrap();
    assert_eq!(r.alignment, Alignment::Left);
    assert!(r.items.is_empty());
}

// =============================================================
// Template: construction
// =============================================================

#[test]
fn template_new_is_empty() {
    let t = Template::new();
    assert!(t.is_empty());
    assert_eq!(t.next_row_id(), Some(1));
}

#[test]
fn from_rows_keeps_listed_order() {
    let t = Template::from_rows(vec![row(5, &["A"]), row(2, &["B"])]).unwrap();
    assert_eq!(t.order(), &[5, 2]);
    assert_eq!(t.next_row_id(), Some(6));
}

#[test]
fn highest_row_id_loads_but_allows_no_new_rows() {
    let mut t: Template = serde_json::from_str(r#"{"rows":[{"id":4294967295,"items":["A"]}]}"#).unwrap();
    assert_eq!(t.next_row_id(), None);
    assert_eq!(t.add_new_row(vec!["B".into()]), Err(TemplateError::RowIdsExhausted));
    assert_eq!(t.order(), &[RowId::MAX]);
}

#[test]
fn last_row_id_is_handed_out_once() {
    let mut t = Template::from_rows(vec![row(RowId::MAX - 1, &["A"])]).unwrap();
    assert_eq!(t.add_new_row(vec!["B".into()]), Ok(RowId::MAX));
    assert_eq!(t.next_row_id(), None);
    assert_eq!(t.add_new_row(vec!["C".into()]), Err(TemplateError::RowIdsExhausted));
}

#[test]
fn from_rows_rejects_duplicate_row() {
    let err = Template::from_rows(vec![row(1, &["A"]), row(1, &["B"])]).unwrap_err();
    assert_eq!(err, TemplateError::DuplicateRow(1));
}

#[test]
fn from_rows_rejects_overfull_row() {
    let err = Template::from_rows(vec![row(1, &["A", "B", "C", "D"])]).unwrap_err();
    assert_eq!(err, TemplateError::TooManyItems { count: 4 });
}

#[test]
fn from_rows_rejects_item_in_two_rows() {
    let err = Template::from_rows(vec![row(1, &["A"]), row(2, &["A"])]).unwrap_err();
    assert_eq!(err, TemplateError::DuplicateItem("A".into()));
}

#[test]
fn snapshot_roundtrip_keeps_order() {
    let mut t = sample();
    t.reorder_row_containers(vec![3, 1, 2]).unwrap();
    let json = serde_json::to_value(&t).unwrap();
    assert_eq!(json["order"], serde_json::json!([3, 1, 2]));
    assert_eq!(json["rows"][0]["id"], 3);

    let back: Template = serde_json::from_value(json).unwrap();
    assert_eq!(back.order(), &[3, 1, 2]);
    assert_eq!(back.row(1), t.row(1));
}

#[test]
fn snapshot_with_bad_order_is_rejected() {
    let json = r#"{ "rows": [ { "id": 1, "items": ["A"] } ], "order": [1, 2] }"#;
    assert!(serde_json::from_str::<Template>(json).is_err());
}

// =============================================================
// Template: queries
// =============================================================

#[test]
fn find_container_resolves_rows_items_and_sentinel() {
    let t = sample();
    assert_eq!(t.find_container(&DragId::Row(2)), Some(2));
    assert_eq!(t.find_container(&DragId::Row(9)), None);
    assert_eq!(t.find_container(&DragId::item("B")), Some(1));
    assert_eq!(t.find_container(&DragId::item("Z")), None);
    assert_eq!(t.find_container(&DragId::NewRow), None);
}

#[test]
fn first_empty_row_uses_id_order() {
    let t = Template::from_rows(vec![row(7, &[]), row(2, &[]), row(1, &["A"])]).unwrap();
    assert_eq!(t.first_empty_row(), Some(2));
}

#[test]
fn rows_iterate_in_display_order() {
    let mut t = sample();
    t.move_row(3, 1).unwrap();
    let ids: Vec<RowId> = t.rows().map(|r| r.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

// =============================================================
// Template: row order
// =============================================================

#[test]
fn move_row_unknown_is_error() {
    let mut t = sample();
    assert_eq!(t.move_row(9, 1), Err(TemplateError::UnknownRow(9)));
}

#[test]
fn reorder_requires_permutation() {
    let mut t = sample();
    assert_eq!(t.reorder_row_containers(vec![1, 2]), Err(TemplateError::InvalidOrder));
    assert_eq!(t.reorder_row_containers(vec![1, 1, 2]), Err(TemplateError::InvalidOrder));
    assert_eq!(t.reorder_row_containers(vec![1, 2, 4]), Err(TemplateError::InvalidOrder));
    assert!(t.reorder_row_containers(vec![2, 3, 1]).is_ok());
    assert_eq!(t.order(), &[2, 3, 1]);
}

// =============================================================
// Template: row contents
// =============================================================

#[test]
fn add_new_row_appends_with_fresh_id() {
    let mut t = sample();
    t.delete_row(3).unwrap();
    let id = t.add_new_row(vec!["D".into()]).unwrap();
    assert_eq!(id, 4);
    assert_eq!(t.order(), &[1, 2, 4]);
}

#[test]
fn add_new_row_validates_items() {
    let mut t = sample();
    assert_eq!(t.add_new_row(Vec::new()), Err(TemplateError::NoItems));
    assert_eq!(
        t.add_new_row(vec!["D".into(), "E".into(), "F".into(), "G".into()]),
        Err(TemplateError::TooManyItems { count: 4 })
    );
    assert_eq!(t.add_new_row(vec!["A".into()]), Err(TemplateError::DuplicateItem("A".into())));
    assert_eq!(
        t.add_new_row(vec!["D".into(), "D".into()]),
        Err(TemplateError::DuplicateItem("D".into()))
    );
}

#[test]
fn delete_row_removes_from_order() {
    let mut t = sample();
    let removed = t.delete_row(2).unwrap();
    assert_eq!(removed.items, vec!["C"]);
    assert_eq!(t.order(), &[1, 3]);
    assert_eq!(t.delete_row(2), Err(TemplateError::UnknownRow(2)));
}

#[test]
fn delete_item_leaves_empty_row() {
    let mut t = sample();
    t.delete_item_from_row(2, "C").unwrap();
    assert_eq!(t.row(2).map(|r| r.items.len()), Some(0));
    assert_eq!(
        t.delete_item_from_row(2, "C"),
        Err(TemplateError::UnknownItem { row: 2, item: "C".into() })
    );
}

#[test]
fn add_item_to_row_respects_capacity() {
    let mut t = sample();
    assert_eq!(
        t.add_item_to_row(1, vec!["X".into(), "Y".into()]),
        Err(TemplateError::RowFull { row: 1, capacity: MAX_ITEMS_PER_ROW })
    );
    t.add_item_to_row(1, vec!["X".into()]).unwrap();
    assert_eq!(t.row(1).map(|r| r.items.clone()), Some(vec!["A".into(), "B".into(), "X".into()]));
}

#[test]
fn edit_row_appends_single_product() {
    let mut t = sample();
    t.edit_row(2, "Lamp".into()).unwrap();
    assert_eq!(t.row(2).map(|r| r.items.clone()), Some(vec!["C".into(), "Lamp".into()]));
    assert_eq!(t.edit_row(9, "Sofa".into()), Err(TemplateError::UnknownRow(9)));
}

#[test]
fn insert_item_clamps_index() {
    let mut t = sample();
    t.insert_item(2, "X".into(), 10).unwrap();
    assert_eq!(t.row(2).map(|r| r.items.clone()), Some(vec!["C".into(), "X".into()]));
}

#[test]
fn insert_item_into_full_row_fails() {
    let mut t = Template::from_rows(vec![row(1, &["A", "B", "C"])]).unwrap();
    assert_eq!(
        t.insert_item(1, "D".into(), 0),
        Err(TemplateError::RowFull { row: 1, capacity: MAX_ITEMS_PER_ROW })
    );
}

#[test]
fn move_item_out_of_range_fails() {
    let mut t = sample();
    assert_eq!(t.move_item(1, 0, 5), Err(TemplateError::IndexOutOfRange { row: 1, index: 5 }));
    t.move_item(1, 1, 0).unwrap();
    assert_eq!(t.row(1).map(|r| r.items.clone()), Some(vec!["B".into(), "A".into()]));
}

#[test]
fn set_alignment_updates_row() {
    let mut t = sample();
    t.set_alignment(1, Alignment::Center).unwrap();
    assert_eq!(t.row(1).map(|r| r.alignment), Some(Alignment::Center));
    assert_eq!(t.set_alignment(9, Alignment::Right), Err(TemplateError::UnknownRow(9)));
}

#[test]
fn remaining_capacity_per_row() {
    let t = sample();
    assert_eq!(t.remaining_capacity(1), Some(1));
    assert_eq!(t.remaining_capacity(3), Some(3));
    assert_eq!(t.remaining_capacity(9), None);
}

// =============================================================
// Mutations
// =============================================================

#[test]
fn apply_all_runs_in_order() {
    let mut t = sample();
    t.apply_all(&[
        Mutation::RemoveItem { row: 1, item: "A".into() },
        Mutation::InsertItem { row: 2, item: "A".into(), index: 0 },
        Mutation::DeleteRow { row: 3 },
        Mutation::AddRow { items: vec!["N".into()] },
    ])
    .unwrap();
    assert_eq!(t.row(2).map(|r| r.items.clone()), Some(vec!["A".into(), "C".into()]));
    assert_eq!(t.order(), &[1, 2, 4]);
}

#[test]
fn mutation_serde_is_tagged() {
    let json = serde_json::to_value(Mutation::MoveRow { row: 3, to: 1 }).unwrap();
    assert_eq!(json, serde_json::json!({ "op": "move_row", "row": 3, "to": 1 }));
}

#[test]
fn array_move_is_stable() {
    let mut v = vec![1, 2, 3, 4];
    assert!(array_move(&mut v, 3, 0));
    assert_eq!(v, vec![4, 1, 2, 3]);
    assert!(array_move(&mut v, 0, 2));
    assert_eq!(v, vec![1, 2, 4, 3]);
    assert!(!array_move(&mut v, 4, 0));
}

// =============================================================
// Products
// =============================================================

#[test]
fn draft_requires_name_and_price() {
    assert_eq!(ProductDraft::new("  ").with_price(1.0).into_product(), Err(CatalogError::MissingName));
    assert_eq!(ProductDraft::new("Lamp").into_product(), Err(CatalogError::MissingPrice));
    assert_eq!(
        ProductDraft::new("Lamp").with_price(-1.0).into_product(),
        Err(CatalogError::InvalidPrice(-1.0))
    );
}

#[test]
fn draft_into_product_trims_name() {
    let product = ProductDraft::new(" Lamp ").with_price(12.5).into_product().unwrap();
    assert_eq!(product.name, "Lamp");
    assert_eq!(product.price, 12.5);
    assert!(product.image.is_empty());
}

#[test]
fn image_upload_becomes_data_url() {
    let mut draft = ProductDraft::new("Lamp").with_price(1.0);
    assert!(draft.attach_image(&ImageUpload::new("image/png", b"png".to_vec())));
    assert_eq!(draft.image.as_deref(), Some("data:image/png;base64,cG5n"));
}

#[test]
fn non_image_upload_is_ignored() {
    let mut draft = ProductDraft::new("Lamp").with_price(1.0);
    draft.attach_image(&ImageUpload::new("image/gif", b"gif".to_vec()));
    assert!(!draft.attach_image(&ImageUpload::new("text/plain", b"hello".to_vec())));
    assert_eq!(draft.image.as_deref(), Some("data:image/gif;base64,Z2lm"));
}

#[test]
fn catalog_add_and_lookup() {
    let mut catalog = Catalog::new();
    let id = catalog.add_product(Product { name: "Lamp".into(), price: 3.0, image: String::new() });
    assert_eq!(id, "Lamp");
    assert_eq!(catalog.get_product("Lamp").map(|p| p.price), Some(3.0));
    assert!(catalog.get_product("Sofa").is_none());

    catalog.add_product(Product { name: "Lamp".into(), price: 4.0, image: String::new() });
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get_product("Lamp").map(|p| p.price), Some(4.0));
}

#[test]
fn catalog_serde_is_a_list() {
    let json = r#"[ { "name": "Lamp", "price": 3.5 }, { "name": "Sofa", "price": 100, "image": "data:image/png;base64,AA==" } ]"#;
    let catalog: Catalog = serde_json::from_str(json).unwrap();
    assert_eq!(catalog.len(), 2);
    assert!(catalog.contains("Sofa"));
    assert_eq!(serde_json::to_value(&catalog).unwrap().as_array().map(Vec::len), Some(2));
}
