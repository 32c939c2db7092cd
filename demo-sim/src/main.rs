//! Deterministic server/client loopback over a lossy in-memory channel.
//!
//! Drives a set of pawns through the full stack — simulate, record, delta
//! encode, byte export, loss/duplication/delay, dejitter, smoothing,
//! prediction, freeze — and verifies the client converges on the server
//! within quantization tolerance.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bitbuf::BitBuffer;
use clap::Parser;
use demo_state::{PawnCommand, PawnFactory, PawnLogic, PawnState};
use replica::{EntityId, HasTick, StateDelta, Tick};
use replication::{
    ClientEntity, Controller, Factory, FactoryKind, Scope, ServerEntity, SyncConfig,
};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "demo-sim", version, about = "Deterministic statesync loopback simulation")]
struct Cli {
    /// Number of simulated pawns; the first is client-controlled.
    #[arg(long, default_value_t = 8)]
    players: u32,
    /// Number of server ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// RNG seed for deterministic results.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Probability a frame is dropped.
    #[arg(long, default_value_t = 0.1)]
    drop_rate: f32,
    /// Probability a delivered frame is duplicated.
    #[arg(long, default_value_t = 0.05)]
    duplicate_rate: f32,
    /// Probability a frame is delayed by an extra send interval.
    #[arg(long, default_value_t = 0.1)]
    delay_rate: f32,
    /// Base one-way latency in ticks.
    #[arg(long, default_value_t = 2)]
    latency_ticks: u32,
    /// Optional path for the JSON summary.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Fail when any pawn ends further from the server than this.
    #[arg(long, default_value_t = 0.05)]
    max_divergence: f32,
}

/// xorshift64*; the whole run is reproducible from the seed.
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    players: u32,
    ticks: u32,
    seed: u64,
    frames_sent: u64,
    frames_dropped: u64,
    frames_duplicated: u64,
    frames_delayed: u64,
    frames_delivered: u64,
    bytes_sent: u64,
    freeze_events: u64,
    max_divergence: f32,
}

/// Command feed for the locally controlled pawn.
#[derive(Debug, Default)]
struct CommandFeed {
    pending: Vec<PawnCommand>,
}

impl Controller for CommandFeed {
    type Command = PawnCommand;

    fn latest_command(&self) -> Option<&PawnCommand> {
        self.pending.last()
    }

    fn pending_commands(&self) -> &[PawnCommand] {
        &self.pending
    }
}

struct Packet {
    deliver_at: Tick,
    bytes: Vec<u8>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if cli.players == 0 {
        bail!("need at least one player");
    }

    let config = SyncConfig::default();
    let send_rate = config.network_send_rate.get();
    let mut rng = Rng::new(cli.seed);
    let factory = PawnFactory;

    let mut servers: Vec<ServerEntity<PawnLogic>> = Vec::new();
    let mut clients: HashMap<EntityId, ClientEntity<PawnLogic>> = HashMap::new();
    for i in 1..=cli.players {
        let id = EntityId::new(i);
        let kind = FactoryKind::new(i % 2);
        let mut server = ServerEntity::new(id, kind, factory.create(kind), &config);
        server.state_mut().archetype = kind.raw();
        server.state_mut().x = (i as f32 * 17.0) % 200.0 - 100.0;
        server.state_mut().y = (i as f32 * 29.0) % 200.0 - 100.0;
        if i == 1 {
            server.state_mut().owner = 1;
            server.state_mut().energy = 100;
            server.set_controlled(true);
        }
        servers.push(server);

        let mut client = ClientEntity::new(id, kind, factory.create(kind), &config);
        if i == 1 {
            client.set_controlled(true);
        }
        clients.insert(id, client);
    }

    let owned_id = EntityId::new(1);
    let mut feed = CommandFeed::default();
    let mut summary = Summary {
        players: cli.players,
        ticks: cli.ticks,
        seed: cli.seed,
        ..Summary::default()
    };
    let mut in_flight: Vec<Packet> = Vec::new();
    let mut acked: HashMap<EntityId, Tick> = HashMap::new();
    let mut frozen_now: HashMap<EntityId, bool> = HashMap::new();
    let mut scratch = BitBuffer::new();

    for step in 1..=cli.ticks {
        let tick = Tick::new(step);

        // Input: the controlled pawn gets a fresh command most ticks.
        if rng.chance(0.8) {
            feed.pending.push(PawnCommand {
                dx: rng.next_f32() - 0.5,
                dy: rng.next_f32() - 0.5,
            });
            if feed.pending.len() > 4 {
                feed.pending.remove(0);
            }
        }

        // Server: simulate every pawn, record history.
        for server in &mut servers {
            let controller = (server.id() == owned_id)
                .then_some(&feed as &dyn Controller<Command = PawnCommand>);
            server.update(controller);
            server.store_record(tick);
        }

        // Send cadence: one frame per pawn through the lossy channel.
        if step % send_rate == 0 {
            for server in &servers {
                let basis = acked.get(&server.id()).copied().unwrap_or(Tick::INVALID);
                let scope = if server.id() == owned_id {
                    Scope::Owner
                } else {
                    Scope::Proxy
                };
                let Some(frame) = server.produce_delta(tick, basis, scope) else {
                    continue;
                };

                scratch.clear();
                frame.encode(&mut scratch);
                let bytes = scratch.to_bytes();
                summary.frames_sent += 1;
                summary.bytes_sent += bytes.len() as u64;

                if rng.chance(cli.drop_rate) {
                    summary.frames_dropped += 1;
                    continue;
                }
                let mut delay = cli.latency_ticks;
                if rng.chance(cli.delay_rate) {
                    summary.frames_delayed += 1;
                    delay += send_rate;
                }
                in_flight.push(Packet {
                    deliver_at: tick + delay,
                    bytes: bytes.clone(),
                });
                if rng.chance(cli.duplicate_rate) {
                    summary.frames_duplicated += 1;
                    in_flight.push(Packet {
                        deliver_at: tick + delay + 1,
                        bytes,
                    });
                }
            }
        }

        // Client: deliver due packets, then advance every entity.
        let mut due: Vec<Packet> = Vec::new();
        in_flight.retain_mut(|packet| {
            if packet.deliver_at <= tick {
                due.push(Packet {
                    deliver_at: packet.deliver_at,
                    bytes: std::mem::take(&mut packet.bytes),
                });
                false
            } else {
                true
            }
        });
        due.sort_by_key(|packet| packet.deliver_at.raw());
        for packet in due {
            let mut buf = BitBuffer::from_bytes(&packet.bytes).context("corrupt packet slab")?;
            match StateDelta::<PawnState>::decode(&mut buf) {
                Ok(frame) => {
                    summary.frames_delivered += 1;
                    if let Some(client) = clients.get_mut(&frame.entity_id()) {
                        acked.insert(frame.entity_id(), frame.tick());
                        client.receive_delta(frame);
                    }
                }
                Err(err) => debug!(%err, "discarding malformed frame"),
            }
        }

        for client in clients.values_mut() {
            let controller = (client.id() == owned_id)
                .then_some(&feed as &dyn Controller<Command = PawnCommand>);
            client.update(tick, controller);
            client.update_freeze(tick);
            let was_frozen = frozen_now.insert(client.id(), client.is_frozen());
            if client.is_frozen() && was_frozen != Some(true) {
                summary.freeze_events += 1;
            }
        }
    }

    // Settle: stop inputs, deliver one reliable full snapshot per pawn.
    feed.pending.clear();
    let settle = Tick::new(cli.ticks + 1);
    for server in &mut servers {
        server.store_record(settle);
        let frame = server
            .produce_delta(settle, Tick::INVALID, Scope::Proxy)
            .context("settle frame missing")?;
        scratch.clear();
        frame.encode(&mut scratch);
        let bytes = scratch.to_bytes();
        let mut buf = BitBuffer::from_bytes(&bytes).context("corrupt settle slab")?;
        let frame = StateDelta::<PawnState>::decode(&mut buf).context("corrupt settle frame")?;
        if let Some(client) = clients.get_mut(&frame.entity_id()) {
            client.receive_delta(frame);
            client.update(settle, None);
        }
    }

    for server in &servers {
        let client = &clients[&server.id()];
        let dx = (client.state().x - server.state().x).abs();
        let dy = (client.state().y - server.state().y).abs();
        summary.max_divergence = summary.max_divergence.max(dx).max(dy);
    }

    info!(
        frames = summary.frames_sent,
        bytes = summary.bytes_sent,
        dropped = summary.frames_dropped,
        freezes = summary.freeze_events,
        divergence = summary.max_divergence,
        "simulation complete"
    );

    if let Some(path) = &cli.out {
        let json = serde_json::to_string_pretty(&summary).context("serialize summary")?;
        fs::write(path, json).with_context(|| format!("write summary to {}", path.display()))?;
    }

    if summary.max_divergence > cli.max_divergence {
        bail!(
            "client diverged by {} (budget {})",
            summary.max_divergence,
            cli.max_divergence
        );
    }
    Ok(())
}
