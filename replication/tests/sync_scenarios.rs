//! End-to-end server -> wire -> client scenarios.

mod common;

use bitbuf::BitBuffer;
use common::{PipeController, PipeLogic, PipeState};
use replica::{EntityId, State, StateDelta, Tick};
use replication::{ClientEntity, FactoryKind, Scope, ServerEntity, SyncConfig};

fn server_entity(config: &SyncConfig) -> ServerEntity<PipeLogic> {
    ServerEntity::new(EntityId::new(1), FactoryKind::new(1), PipeLogic, config)
}

fn client_entity(config: &SyncConfig) -> ClientEntity<PipeLogic> {
    ClientEntity::new(EntityId::new(1), FactoryKind::new(1), PipeLogic, config)
}

/// Ships one produced frame through bytes, exactly as a transport would.
fn ship(delta: &StateDelta<PipeState>) -> StateDelta<PipeState> {
    let mut buf = BitBuffer::new();
    delta.encode(&mut buf);
    let bytes = buf.to_bytes();

    let mut received = BitBuffer::from_bytes(&bytes).expect("well-formed slab");
    StateDelta::decode(&mut received).expect("well-formed frame")
}

#[test]
fn full_then_delta_roundtrip() {
    let config = SyncConfig::for_testing();
    let mut server = server_entity(&config);
    *server.state_mut() = PipeState::at(10.0, 20.0);
    server.store_record(Tick::new(3));

    // Bootstrap: full snapshot against no basis.
    let full = server
        .produce_delta(Tick::new(3), Tick::INVALID, Scope::Owner)
        .unwrap();
    let shipped = ship(&full);
    assert!(shipped.has_immutable());
    assert!(shipped.state().unwrap().matches(&PipeState::at(10.0, 20.0)));

    // One field moves; the delta carries exactly that field.
    server.state_mut().y = 20.5;
    server.store_record(Tick::new(6));
    let delta = server
        .produce_delta(Tick::new(6), Tick::new(3), Scope::Owner)
        .unwrap();
    assert_eq!(
        delta.flags(),
        replica::DirtyFlags::field(PipeState::FIELD_Y)
    );

    let shipped = ship(&delta);
    let mut reconstructed = PipeState::at(10.0, 20.0);
    reconstructed.apply_delta(shipped.state().unwrap(), shipped.flags());
    assert!(reconstructed.matches(&PipeState::at(10.0, 20.5)));
}

#[test]
fn server_to_client_pipeline() {
    let config = SyncConfig::for_testing();
    let mut server = server_entity(&config);
    let mut client = client_entity(&config);

    let mut basis_tick = Tick::INVALID;
    for step in 1..=4u32 {
        let tick = Tick::new(step * 3);
        server.state_mut().x = step as f32;
        server.state_mut().y = step as f32 * 2.0;
        server.store_record(tick);

        let delta = server.produce_delta(tick, basis_tick, Scope::Proxy).unwrap();
        client.receive_delta(ship(&delta));
        client.update(tick, None);
        basis_tick = tick;
    }

    assert!(
        client.state().matches(server.state()),
        "client {:?} must converge on server {:?}",
        client.state(),
        server.state()
    );
}

#[test]
fn proxy_never_sees_private_fields() {
    let config = SyncConfig::for_testing();
    let mut server = server_entity(&config);
    *server.state_mut() = PipeState::at(1.0, 1.0);
    server.state_mut().status = 42;
    server.store_record(Tick::new(3));

    let full = server
        .produce_delta(Tick::new(3), Tick::INVALID, Scope::Proxy)
        .unwrap();
    assert!(!full.flags().contains(replica::DirtyFlags::field(PipeState::FIELD_STATUS)));

    let shipped = ship(&full);
    let mut client_view = PipeState::default();
    client_view.apply_delta(shipped.state().unwrap(), shipped.flags());
    assert_eq!(client_view.status, 0, "private field must not replicate");
    assert!((client_view.x - 1.0).abs() < 0.01);

    let owner = server
        .produce_delta(Tick::new(3), Tick::INVALID, Scope::Owner)
        .unwrap();
    let shipped = ship(&owner);
    let mut owner_view = PipeState::default();
    owner_view.apply_delta(shipped.state().unwrap(), shipped.flags());
    assert_eq!(owner_view.status, 42);
}

#[test]
fn destruction_propagates_removed_tick() {
    let config = SyncConfig::for_testing();
    let mut server = server_entity(&config);
    *server.state_mut() = PipeState::at(0.0, 0.0);
    server.store_record(Tick::new(3));
    server.mark_for_remove(Tick::new(3));

    let frame = server
        .produce_delta(Tick::new(4), Tick::new(3), Scope::Proxy)
        .unwrap();
    let shipped = ship(&frame);

    let mut client = client_entity(&config);
    client.receive_delta(shipped);
    assert_eq!(client.removed_tick(), Tick::new(4));
}

#[test]
fn owned_entity_predicts_ahead_of_confirmed() {
    let config = SyncConfig::for_testing();
    let mut server = server_entity(&config);
    let mut client = client_entity(&config);

    *server.state_mut() = PipeState::at(0.0, 0.0);
    server.store_record(Tick::new(3));
    let full = server
        .produce_delta(Tick::new(3), Tick::INVALID, Scope::Owner)
        .unwrap();
    client.receive_delta(ship(&full));

    client.set_controlled(true);
    let controller = PipeController {
        commands: vec![1.0, 2.0, 1.0],
    };
    client.update(Tick::new(3), Some(&controller));

    // Confirmed x is 0; prediction replays the pending commands on top.
    assert!((client.state().x - 4.0).abs() < 1e-5);
}

#[test]
fn malformed_frame_leaves_session_alive() {
    let config = SyncConfig::for_testing();
    let mut server = server_entity(&config);
    *server.state_mut() = PipeState::at(5.0, 5.0);
    server.store_record(Tick::new(3));

    let full = server
        .produce_delta(Tick::new(3), Tick::INVALID, Scope::Owner)
        .unwrap();
    let mut buf = BitBuffer::new();
    full.encode(&mut buf);
    let bytes = buf.to_bytes();

    // A truncated datagram fails to decode; the frame is discarded whole.
    let mut truncated = BitBuffer::from_bytes(&bytes[..4]).expect("marker found");
    assert!(StateDelta::<PipeState>::decode(&mut truncated).is_err());

    // The next intact frame still flows.
    let mut client = client_entity(&config);
    client.receive_delta(ship(&full));
    client.update(Tick::new(3), None);
    assert!(client.state().matches(server.state()));
}
