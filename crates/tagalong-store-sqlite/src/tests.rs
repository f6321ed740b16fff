//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use tagalong_core::{
  event::{InviteStatus, Invitee, NewEvent},
  notification::{NewNotification, NotificationKind},
  photo::{BoundingBox, DetectedFace, NewPhoto},
  store::Store,
  user::{NewUser, User},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, name: &str) -> User {
  s.add_user(NewUser {
    name:  name.into(),
    email: format!("{}@example.com", name.to_lowercase()),
  })
  .await
  .unwrap()
}

fn new_event(creator_id: Uuid) -> NewEvent {
  NewEvent {
    creator_id,
    title: "Garden party".into(),
    description: Some("Bring a hat".into()),
    starts_at: Some(Utc::now()),
  }
}

fn invitee(email: &str, code: &str) -> Invitee {
  Invitee {
    invitee_id:   Uuid::new_v4(),
    user_id:      None,
    email:        Some(email.into()),
    code:         code.into(),
    status:       InviteStatus::Pending,
    created_at:   Utc::now(),
    responded_at: None,
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;
  let alice = user(&s, "Alice").await;

  let fetched = s.get_user(alice.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Alice");
  assert_eq!(fetched.email, "alice@example.com");
  assert!(fetched.face_signature_id.is_none());
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn set_face_signature_updates_existing_user_only() {
  let s = store().await;
  let alice = user(&s, "Alice").await;

  assert!(s.set_face_signature(alice.user_id, "sig-1".into()).await.unwrap());
  assert!(!s.set_face_signature(Uuid::new_v4(), "sig-2".into()).await.unwrap());

  let fetched = s.get_user(alice.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.face_signature_id.as_deref(), Some("sig-1"));
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_event_starts_with_no_invitees() {
  let s = store().await;
  let alice = user(&s, "Alice").await;

  let event = s.add_event(new_event(alice.user_id)).await.unwrap();
  let fetched = s.get_event(event.event_id).await.unwrap().unwrap();

  assert_eq!(fetched.creator_id, alice.user_id);
  assert_eq!(fetched.description.as_deref(), Some("Bring a hat"));
  assert!(fetched.starts_at.is_some());
  assert!(fetched.invitees.is_empty());
}

#[tokio::test]
async fn add_event_with_unknown_creator_fails() {
  let s = store().await;
  assert!(s.add_event(new_event(Uuid::new_v4())).await.is_err());
}

#[tokio::test]
async fn save_invitees_replaces_whole_list() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let event = s.add_event(new_event(alice.user_id)).await.unwrap();

  let list = vec![invitee("a@x.com", "c1"), invitee("b@x.com", "c2")];
  assert!(s.save_invitees(event.event_id, list).await.unwrap());

  let fetched = s.get_event(event.event_id).await.unwrap().unwrap();
  assert_eq!(fetched.invitees.len(), 2);
  assert_eq!(fetched.invitees[0].code, "c1");
  assert_eq!(fetched.invitees[1].email.as_deref(), Some("b@x.com"));

  let shorter = vec![fetched.invitees[1].clone()];
  s.save_invitees(event.event_id, shorter).await.unwrap();
  let fetched = s.get_event(event.event_id).await.unwrap().unwrap();
  assert_eq!(fetched.invitees.len(), 1);
  assert_eq!(fetched.invitees[0].code, "c2");
}

#[tokio::test]
async fn save_invitees_on_missing_event_reports_false() {
  let s = store().await;
  assert!(!s.save_invitees(Uuid::new_v4(), vec![]).await.unwrap());
}

// ─── Photos ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn photo_lifecycle() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let event = s.add_event(new_event(alice.user_id)).await.unwrap();

  let photo = s
    .add_photo(NewPhoto {
      event_id:        event.event_id,
      uploader_id:     alice.user_id,
      storage_locator: "ab/cdef.jpg".into(),
      content_type:    "image/jpeg".into(),
    })
    .await
    .unwrap();
  assert!(!photo.is_processed);

  let faces = vec![DetectedFace {
    signature_id: "sig-1".into(),
    user_id:      Some(alice.user_id),
    bounding_box: BoundingBox { width: 0.2, height: 0.3, left: 0.1, top: 0.4 },
    confidence:   97.5,
  }];
  assert!(s.complete_photo(photo.photo_id, faces.clone()).await.unwrap());

  let fetched = s.get_photo(photo.photo_id).await.unwrap().unwrap();
  assert!(fetched.is_processed);
  assert_eq!(fetched.faces, faces);

  let listed = s.list_photos(event.event_id).await.unwrap();
  assert_eq!(listed.len(), 1);

  assert!(s.delete_photo(photo.photo_id).await.unwrap());
  assert!(s.get_photo(photo.photo_id).await.unwrap().is_none());
  assert!(!s.complete_photo(photo.photo_id, vec![]).await.unwrap());
  assert!(!s.delete_photo(photo.photo_id).await.unwrap());
}

#[tokio::test]
async fn list_photos_is_scoped_to_event() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let first = s.add_event(new_event(alice.user_id)).await.unwrap();
  let second = s.add_event(new_event(alice.user_id)).await.unwrap();

  for event_id in [first.event_id, first.event_id, second.event_id] {
    s.add_photo(NewPhoto {
      event_id,
      uploader_id: alice.user_id,
      storage_locator: Uuid::new_v4().to_string(),
      content_type: "image/png".into(),
    })
    .await
    .unwrap();
  }

  assert_eq!(s.list_photos(first.event_id).await.unwrap().len(), 2);
  assert_eq!(s.list_photos(second.event_id).await.unwrap().len(), 1);
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn notification_flags_start_false_and_flip_independently() {
  let s = store().await;
  let alice = user(&s, "Alice").await;

  let n = s
    .add_notification(
      NewNotification::new(NotificationKind::System, "Hello", "Welcome aboard")
        .to_user(alice.user_id, Some(alice.email.clone())),
    )
    .await
    .unwrap();
  assert!(!n.is_read && !n.is_sent);

  assert!(s.mark_notification_sent(n.notification_id).await.unwrap());
  let fetched = s.get_notification(n.notification_id).await.unwrap().unwrap();
  assert!(fetched.is_sent);
  assert!(!fetched.is_read);
  assert_eq!(fetched.kind, NotificationKind::System);

  assert!(s.mark_notification_read(n.notification_id).await.unwrap());
  let fetched = s.get_notification(n.notification_id).await.unwrap().unwrap();
  assert!(fetched.is_read);
}

#[tokio::test]
async fn list_notifications_newest_first() {
  let s = store().await;
  let alice = user(&s, "Alice").await;

  for title in ["first", "second"] {
    s.add_notification(
      NewNotification::new(NotificationKind::System, title, "").to_user(alice.user_id, None),
    )
    .await
    .unwrap();
  }

  let listed = s.list_notifications(alice.user_id).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].title, "second");
}

#[tokio::test]
async fn notification_referencing_missing_event_is_rejected() {
  let s = store().await;
  let result = s
    .add_notification(
      NewNotification::new(NotificationKind::EventInvite, "Invite", "")
        .to_email("a@x.com")
        .about_event(Uuid::new_v4()),
    )
    .await;
  assert!(matches!(result, Err(crate::Error::Database(_))));
}
