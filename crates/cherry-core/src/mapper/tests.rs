use std::sync::Arc;

use uuid::Uuid;

use super::*;
use crate::{
  Error,
  content::ContentId,
  document::DocumentKind,
  identity::{EntityIdentity, EntityKind},
  status::StatusType,
};

fn stored_customer() -> Arc<BaseEntity> {
  let mut owner = BaseEntity::new(EntityKind::Customer);
  owner.name = Some("Ada Lovelace".into());
  owner.reference = Some("C-0001".into());

  let mut invoice = DocumentEntity::new(DocumentKind::Invoice).with_file_name("march.pdf");
  invoice.content_id = Some(ContentId::generate());
  invoice.content_length = 2048;
  invoice.mime_type = "application/pdf".into();

  let mut photo = DocumentEntity::new(DocumentKind::Photo).with_file_name("portrait.jpg");
  photo.status.deactivate();

  owner.with_documents(vec![invoice, photo]).unwrap()
}

// ─── Cycles ──────────────────────────────────────────────────────────────────

#[test]
fn owner_and_documents_are_cross_referenced() {
  let source = stored_customer();
  let mut ctx = MappingContext::new();

  let target = EntityMapper::from_persistent(&source, &mut ctx).unwrap();

  assert_eq!(target.documents().len(), 2);
  for document in target.documents() {
    let owner = document.owner().unwrap().upgrade().unwrap();
    assert!(Arc::ptr_eq(&owner, &target));
  }
  assert_eq!(ctx.len(), 3);
}

#[test]
fn starting_from_a_document_converts_its_owner_once() {
  let source = stored_customer();
  let photo = source.documents()[1].clone();
  let mut ctx = MappingContext::new();

  let target = DocumentMapper::from_persistent(&photo, &mut ctx).unwrap();

  let owner = target.owner().unwrap().upgrade().unwrap();
  assert_eq!(owner.id(), source.id());
  assert!(Arc::ptr_eq(&owner.documents()[1], &target));
  assert_eq!(ctx.mapped::<_, Entity>(&source).map(|o| o.id()), Some(source.id()));
}

#[test]
fn revisiting_a_source_returns_the_same_target() {
  let source = stored_customer();
  let mut ctx = MappingContext::new();

  let first = EntityMapper::from_persistent(&source, &mut ctx).unwrap();
  let second = EntityMapper::from_persistent(&source, &mut ctx).unwrap();
  assert!(Arc::ptr_eq(&first, &second));

  let document = DocumentMapper::from_persistent(&source.documents()[0], &mut ctx).unwrap();
  assert!(Arc::ptr_eq(&document, &first.documents()[0]));
}

#[test]
fn visited_sets_are_per_pass() {
  let source = stored_customer();

  let first = EntityMapper::from_persistent(&source, &mut MappingContext::new()).unwrap();
  let second = EntityMapper::from_persistent(&source, &mut MappingContext::new()).unwrap();

  assert!(!Arc::ptr_eq(&first, &second));
  assert_eq!(*first, *second);
}

#[test]
fn equal_sources_are_still_distinct_sources() {
  let original = Arc::new(DocumentEntity::new(DocumentKind::Generic));
  let twin = Arc::new((*original).clone());
  let mut ctx = MappingContext::new();

  let targets = DocumentMapper::from_persistent_list(&[original, twin], &mut ctx).unwrap();

  assert_eq!(targets.len(), 2);
  assert!(!Arc::ptr_eq(&targets[0], &targets[1]));
  assert_eq!(targets[0], targets[1]);
}

#[test]
fn temporary_sources_in_one_pass_get_their_own_targets() {
  let mut ctx = MappingContext::new();

  for _ in 0..50 {
    let source = Arc::new(DocumentEntity::new(DocumentKind::Generic));
    let id = source.id();

    let target = DocumentMapper::from_persistent(&source, &mut ctx).unwrap();

    assert_eq!(target.id(), id);
  }
  assert_eq!(ctx.len(), 50);
}

// ─── Field copying ───────────────────────────────────────────────────────────

#[test]
fn scalar_fields_survive_a_round_trip() {
  let owner = EntityIdentity::new(Uuid::new_v4(), EntityKind::Shop);
  let mut client = Document::new(DocumentKind::Icon)
    .with_file_name("logo.svg")
    .with_owner(owner);
  client.description = Some("shop logo".into());
  client.tags = Some("brand,logo".into());
  client.mime_type = "image/svg+xml".into();
  client.content_length = 512;
  client.content_id = Some(ContentId::generate().to_string());
  client.status.set_status_type(StatusType::Inactive);
  client.set_content(&b"<svg/>"[..]);
  let client = Arc::new(client);

  let stored = DocumentMapper::from_client(&client, &mut MappingContext::new()).unwrap();
  assert!(stored.content().is_none());
  assert_eq!(stored.content_id.map(|id| id.to_string()), client.content_id);
  assert_eq!(stored.owner_identity(), Some(owner));

  let back = DocumentMapper::from_persistent(&stored, &mut MappingContext::new()).unwrap();
  assert_eq!(*back, *client);
  assert!(back.content().is_none());
  assert!(!back.owner().unwrap().is_attached());
}

#[test]
fn unparsable_content_id_is_a_field_error() {
  let mut client = Document::new(DocumentKind::Generic);
  client.content_id = Some("not-a-content-id".into());

  let err = DocumentMapper::from_client(&Arc::new(client), &mut MappingContext::new()).unwrap_err();

  match err {
    Error::InvalidField { kind, field, value } => {
      assert_eq!(kind, EntityKind::Document);
      assert_eq!(field, "contentId");
      assert_eq!(value, "not-a-content-id");
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn a_failing_document_fails_the_whole_aggregate() {
  let mut bad = Document::new(DocumentKind::Generic);
  bad.content_id = Some("garbage".into());
  let owner = Entity::new(EntityKind::Person)
    .with_documents(vec![Document::new(DocumentKind::Photo), bad])
    .unwrap();

  let result = EntityMapper::from_client(&owner, &mut MappingContext::new());

  assert!(matches!(result, Err(Error::InvalidField { .. })));
}

// ─── Copies ──────────────────────────────────────────────────────────────────

#[test]
fn deep_copies_are_distinct_but_equal() {
  let source = stored_customer();

  let once = EntityMapper::copy_persistent(&source, &mut MappingContext::new()).unwrap();
  let twice = EntityMapper::copy_persistent(&once, &mut MappingContext::new()).unwrap();

  assert!(!Arc::ptr_eq(&source, &once));
  assert!(!Arc::ptr_eq(&once, &twice));
  assert_eq!(*twice, *source);
  for (copied, original) in twice.documents().iter().zip(source.documents()) {
    assert!(!Arc::ptr_eq(copied, original));
    assert_eq!(**copied, **original);
    assert!(Arc::ptr_eq(&copied.owner().unwrap().upgrade().unwrap(), &twice));
  }
}

#[test]
fn client_copies_keep_the_opaque_content_id() {
  let mut document = Document::new(DocumentKind::Generic);
  document.content_id = Some("anything-goes-here".into());
  let document = Arc::new(document);

  let copy = DocumentMapper::copy_client(&document, &mut MappingContext::new()).unwrap();

  assert_eq!(copy.content_id.as_deref(), Some("anything-goes-here"));
  assert!(!Arc::ptr_eq(&copy, &document));
}

#[test]
fn client_lists_convert_in_order() {
  let owners: Vec<_> = ["Ada", "Grace"]
    .into_iter()
    .map(|name| {
      let mut entity = Entity::new(EntityKind::Employee);
      entity.name = Some(name.into());
      Arc::new(entity)
    })
    .collect();

  let stored = EntityMapper::from_client_list(&owners, &mut MappingContext::new()).unwrap();

  let names: Vec<_> = stored.iter().map(|e| e.name.clone().unwrap()).collect();
  assert_eq!(names, ["Ada", "Grace"]);
}

// ─── Owner links ─────────────────────────────────────────────────────────────

#[test]
fn documents_without_owner_stay_without_owner() {
  let source = Arc::new(DocumentEntity::new(DocumentKind::Generic));
  let target = DocumentMapper::from_persistent(&source, &mut MappingContext::new()).unwrap();
  assert!(target.owner().is_none());
}

#[test]
fn dropped_owner_maps_to_a_detached_reference() {
  let source = stored_customer();
  let document = source.documents()[0].clone();
  let owner_identity = source.identity();
  drop(source);

  let mut ctx = MappingContext::new();
  let target = DocumentMapper::from_persistent(&document, &mut ctx).unwrap();

  let owner = target.owner().unwrap();
  assert_eq!(owner.identity(), owner_identity);
  assert!(!owner.is_attached());
  assert_eq!(ctx.len(), 1);
}
