use std::sync::Arc;

use argon2::ParamsBuilder;
use lifeline_core::auth::AuthCrypto;
use lifeline_core::error::DispatchError;
use lifeline_core::store::memory::MemoryStore;
use lifeline_core::DispatchService;
use lifeline_model::{
    NewMessage, NewRescuer, NewTicket, RescuerStatus, RescuerUpdate, TicketStatus,
};

fn cheap_crypto() -> AuthCrypto {
    let params = ParamsBuilder::new()
        .m_cost(8)
        .t_cost(1)
        .p_cost(1)
        .build()
        .unwrap();
    AuthCrypto::with_params(params).unwrap()
}

fn service() -> (DispatchService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = DispatchService::new(store.clone(), Arc::new(cheap_crypto()));
    (service, store)
}

fn sample_ticket(number: &str) -> NewTicket {
    NewTicket {
        ticket_number: number.to_string(),
        service_type: "medical".to_string(),
        user_name: "Jordan Doe".to_string(),
        phone: "555-0100".to_string(),
        latitude: 40.7128,
        longitude: -74.0060,
        incident_details: "collapsed near the pier".to_string(),
    }
}

fn sample_rescuer(badge: &str, name: &str) -> NewRescuer {
    NewRescuer {
        name: name.to_string(),
        badge_id: badge.to_string(),
        callsign: format!("unit-{badge}"),
        phone: "555-0199".to_string(),
        password: "s3cret".to_string(),
        image: None,
    }
}

async fn rescuer_status(service: &DispatchService, badge: &str) -> RescuerStatus {
    service
        .list_on_duty()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.badge_id == badge)
        .map(|r| r.status)
        .unwrap_or(RescuerStatus::OffDuty)
}

#[tokio::test]
async fn failed_assignment_leaves_both_sides_untouched() {
    let (service, store) = service();
    let ticket = service.create_ticket(sample_ticket("SOS-100")).await.unwrap();
    let rescuer = service
        .register_rescuer(sample_rescuer("B-100", "Alex"))
        .await
        .unwrap();

    store.fail_next_write();
    let err = service
        .assign(ticket.id, rescuer.id, &rescuer.name)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Storage(_)));

    let view = service.ticket_status("SOS-100").await.unwrap();
    assert_eq!(view.status, TicketStatus::Active);
    assert_eq!(view.rescuer_name, None);
    assert_eq!(rescuer_status(&service, "B-100").await, RescuerStatus::Available);
}

#[tokio::test]
async fn successful_assignment_updates_both_sides_together() {
    let (service, _store) = service();
    let ticket = service.create_ticket(sample_ticket("SOS-101")).await.unwrap();
    let rescuer = service
        .register_rescuer(sample_rescuer("B-101", "Alex"))
        .await
        .unwrap();

    service
        .assign(ticket.id, rescuer.id, &rescuer.name)
        .await
        .unwrap();

    let view = service.ticket_status("SOS-101").await.unwrap();
    assert_eq!(view.status, TicketStatus::Dispatched);
    assert_eq!(view.rescuer_name.as_deref(), Some("Alex"));
    assert_eq!(rescuer_status(&service, "B-101").await, RescuerStatus::OnMission);

    let open = service.list_open_tickets().await.unwrap();
    let dispatched = open.iter().find(|t| t.id == ticket.id).unwrap();
    assert_eq!(dispatched.rescuer_id, Some(rescuer.id));
}

#[tokio::test]
async fn location_report_derives_responding_while_dispatched() {
    let (service, _store) = service();
    let ticket = service.create_ticket(sample_ticket("SOS-102")).await.unwrap();
    let rescuer = service
        .register_rescuer(sample_rescuer("B-102", "Sam"))
        .await
        .unwrap();
    service
        .assign(ticket.id, rescuer.id, &rescuer.name)
        .await
        .unwrap();

    let status = service
        .report_location(rescuer.id, 40.0, -74.0)
        .await
        .unwrap();
    assert_eq!(status, RescuerStatus::Responding);
}

#[tokio::test]
async fn location_report_derives_available_without_active_mission() {
    let (service, _store) = service();
    let rescuer = service
        .register_rescuer(sample_rescuer("B-103", "Sam"))
        .await
        .unwrap();

    let status = service
        .report_location(rescuer.id, 40.0, -74.0)
        .await
        .unwrap();
    assert_eq!(status, RescuerStatus::Available);
}

#[tokio::test]
async fn solving_a_solved_ticket_frees_the_location_derivation() {
    let (service, _store) = service();
    let ticket = service.create_ticket(sample_ticket("SOS-104")).await.unwrap();
    let rescuer = service
        .register_rescuer(sample_rescuer("B-104", "Kim"))
        .await
        .unwrap();
    service
        .assign(ticket.id, rescuer.id, &rescuer.name)
        .await
        .unwrap();
    service.solve(ticket.id).await.unwrap();

    // The DISPATCHED ticket is gone, so the next report frees the rescuer.
    let status = service
        .report_location(rescuer.id, 41.0, -75.0)
        .await
        .unwrap();
    assert_eq!(status, RescuerStatus::Available);
}

#[tokio::test]
async fn solve_is_idempotent() {
    let (service, _store) = service();
    let ticket = service.create_ticket(sample_ticket("SOS-105")).await.unwrap();

    service.solve(ticket.id).await.unwrap();
    service.solve(ticket.id).await.unwrap();

    let view = service.ticket_status("SOS-105").await.unwrap();
    assert_eq!(view.status, TicketStatus::Solved);
}

#[tokio::test]
async fn solve_does_not_free_the_rescuer() {
    let (service, _store) = service();
    let ticket = service.create_ticket(sample_ticket("SOS-106")).await.unwrap();
    let rescuer = service
        .register_rescuer(sample_rescuer("B-106", "Robin"))
        .await
        .unwrap();
    service
        .assign(ticket.id, rescuer.id, &rescuer.name)
        .await
        .unwrap();

    service.solve(ticket.id).await.unwrap();
    assert_eq!(rescuer_status(&service, "B-106").await, RescuerStatus::OnMission);
}

#[tokio::test]
async fn update_without_image_preserves_stored_bytes() {
    let (service, _store) = service();
    let mut new = sample_rescuer("B-107", "Casey");
    new.image = Some(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02]);
    let rescuer = service.register_rescuer(new).await.unwrap();

    let updated = service
        .update_rescuer(
            rescuer.id,
            RescuerUpdate {
                name: Some("Casey Updated".to_string()),
                phone: Some("555-0200".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Casey Updated");

    let image = service.rescuer_image(rescuer.id).await.unwrap();
    assert_eq!(image, vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02]);
}

#[tokio::test]
async fn update_with_image_overwrites_stored_bytes() {
    let (service, _store) = service();
    let mut new = sample_rescuer("B-108", "Casey");
    new.image = Some(vec![1, 2, 3]);
    let rescuer = service.register_rescuer(new).await.unwrap();

    service
        .update_rescuer(
            rescuer.id,
            RescuerUpdate {
                image: Some(vec![4, 5, 6]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let image = service.rescuer_image(rescuer.id).await.unwrap();
    assert_eq!(image, vec![4, 5, 6]);
}

#[tokio::test]
async fn missing_image_is_not_found() {
    let (service, _store) = service();
    let rescuer = service
        .register_rescuer(sample_rescuer("B-109", "NoPic"))
        .await
        .unwrap();

    let err = service.rescuer_image(rescuer.id).await.unwrap_err();
    assert!(matches!(err, DispatchError::NotFound(_)));
}

#[tokio::test]
async fn chat_messages_come_back_in_send_order() {
    let (service, _store) = service();
    for i in 0..5 {
        service
            .send_message(NewMessage {
                ticket_number: "SOS-110".to_string(),
                sender: "dispatcher".to_string(),
                message: format!("message {i}"),
            })
            .await
            .unwrap();
    }

    let messages = service.messages("SOS-110").await.unwrap();
    assert_eq!(messages.len(), 5);
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message.message, format!("message {i}"));
    }
    for pair in messages.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
}

#[tokio::test]
async fn login_resets_on_mission_rescuer_to_available() {
    let (service, _store) = service();
    let ticket = service.create_ticket(sample_ticket("SOS-111")).await.unwrap();
    let rescuer = service
        .register_rescuer(sample_rescuer("B-111", "Drew"))
        .await
        .unwrap();
    service
        .assign(ticket.id, rescuer.id, &rescuer.name)
        .await
        .unwrap();
    assert_eq!(rescuer_status(&service, "B-111").await, RescuerStatus::OnMission);

    // Current behavior: logging back in overwrites on-mission status.
    let logged_in = service.login("B-111", "s3cret").await.unwrap();
    assert_eq!(logged_in.status, RescuerStatus::Available);
    assert_eq!(rescuer_status(&service, "B-111").await, RescuerStatus::Available);
}

#[tokio::test]
async fn login_failure_is_generic_for_both_factors() {
    let (service, _store) = service();
    service
        .register_rescuer(sample_rescuer("B-112", "Drew"))
        .await
        .unwrap();

    let bad_password = service.login("B-112", "wrong").await.unwrap_err();
    assert!(matches!(bad_password, DispatchError::AuthFailed));

    let bad_badge = service.login("B-999", "s3cret").await.unwrap_err();
    assert!(matches!(bad_badge, DispatchError::AuthFailed));
}

#[tokio::test]
async fn logout_forces_off_duty_and_hides_from_listings() {
    let (service, _store) = service();
    let rescuer = service
        .register_rescuer(sample_rescuer("B-113", "Quinn"))
        .await
        .unwrap();

    service.logout(rescuer.id).await.unwrap();
    assert!(service.list_on_duty().await.unwrap().is_empty());

    service.login("B-113", "s3cret").await.unwrap();
    assert_eq!(rescuer_status(&service, "B-113").await, RescuerStatus::Available);
}

#[tokio::test]
async fn located_listing_requires_known_position_and_duty() {
    let (service, _store) = service();
    let with_location = service
        .register_rescuer(sample_rescuer("B-114", "Avery"))
        .await
        .unwrap();
    service
        .register_rescuer(sample_rescuer("B-115", "Blair"))
        .await
        .unwrap();
    service
        .report_location(with_location.id, 40.0, -74.0)
        .await
        .unwrap();

    let located = service.list_located().await.unwrap();
    assert_eq!(located.len(), 1);
    assert_eq!(located[0].badge_id, "B-114");
}

#[tokio::test]
async fn duplicate_badge_is_a_conflict() {
    let (service, _store) = service();
    service
        .register_rescuer(sample_rescuer("B-116", "First"))
        .await
        .unwrap();

    let err = service
        .register_rescuer(sample_rescuer("B-116", "Second"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Conflict(_)));
}

#[tokio::test]
async fn deleting_a_rescuer_leaves_the_assignment_dangling() {
    let (service, _store) = service();
    let ticket = service.create_ticket(sample_ticket("SOS-117")).await.unwrap();
    let rescuer = service
        .register_rescuer(sample_rescuer("B-117", "Morgan"))
        .await
        .unwrap();
    service
        .assign(ticket.id, rescuer.id, &rescuer.name)
        .await
        .unwrap();

    service.delete_rescuer(rescuer.id).await.unwrap();

    // Weak reference by design: the ticket keeps the stale id and name.
    let view = service.ticket_status("SOS-117").await.unwrap();
    assert_eq!(view.status, TicketStatus::Dispatched);
    assert_eq!(view.rescuer_name.as_deref(), Some("Morgan"));
}

#[tokio::test]
async fn open_ticket_listing_is_newest_first_and_skips_solved() {
    let (service, _store) = service();
    let first = service.create_ticket(sample_ticket("SOS-118")).await.unwrap();
    let second = service.create_ticket(sample_ticket("SOS-119")).await.unwrap();
    let third = service.create_ticket(sample_ticket("SOS-120")).await.unwrap();
    service.solve(second.id).await.unwrap();

    let open = service.list_open_tickets().await.unwrap();
    let ids: Vec<_> = open.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![third.id, first.id]);
}

#[tokio::test]
async fn registration_rejects_empty_credentials() {
    let (service, _store) = service();

    let mut no_badge = sample_rescuer("", "Nobody");
    no_badge.badge_id = "".to_string();
    assert!(matches!(
        service.register_rescuer(no_badge).await.unwrap_err(),
        DispatchError::Validation(_)
    ));

    let mut no_password = sample_rescuer("B-121", "Nobody");
    no_password.password = "".to_string();
    assert!(matches!(
        service.register_rescuer(no_password).await.unwrap_err(),
        DispatchError::Validation(_)
    ));
}
