mod rigs;

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, bail};
use clap::Parser;

use replica::net::sequence_greater_than;
use replica::{
    Authority, EntityId, FixedTimestep, Leviathan, LinkConditions, ManualClock, Packet,
    PacketHeader, PacketType, ReplicationConfig, Session, SimulatedLink, Transport, World,
};
use rigs::{BossSim, LoggingRig, ScriptedRig};

const BOSS: EntityId = EntityId(1);
const BOSS_HEALTH: f32 = 5000.0;
const MARKER_PERIOD: u32 = 3;

#[derive(Parser)]
#[command(name = "replica-sandbox")]
#[command(about = "Runs an owner and a replica of the leviathan over a simulated link")]
struct Args {
    #[arg(short, long, default_value_t = 30.0)]
    seconds: f64,

    #[arg(long, default_value_t = replica::DEFAULT_SEND_RATE)]
    send_rate: u32,

    #[arg(short, long, default_value_t = replica::DEFAULT_TICK_RATE)]
    tick_rate: u32,

    #[arg(long, default_value_t = 0.0, help = "Packet loss percentage (0-100)")]
    loss_percent: f32,

    #[arg(long, default_value_t = 0, help = "Minimum latency in ms")]
    min_latency: u32,

    #[arg(long, default_value_t = 0, help = "Maximum latency in ms")]
    max_latency: u32,

    #[arg(long, default_value_t = 0, help = "Jitter in ms")]
    jitter: u32,

    #[arg(long, default_value_t = 7)]
    seed: u64,

    #[arg(long, default_value_t = 150.0, help = "Health drained per second")]
    drain: f32,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if args.send_rate == 0 || args.tick_rate == 0 {
        bail!("send and tick rates must be positive");
    }
    if !(0.0..=100.0).contains(&args.loss_percent) {
        bail!("loss percentage must be within 0-100");
    }

    let config = ReplicationConfig {
        send_rate: args.send_rate,
        tick_rate: args.tick_rate,
    };
    let conditions = LinkConditions {
        loss_percent: args.loss_percent,
        min_latency_ms: args.min_latency,
        max_latency_ms: args.max_latency.max(args.min_latency),
        jitter_ms: args.jitter,
    };

    if conditions.is_perfect() {
        log::info!("perfect link");
    } else {
        log::info!(
            "loss {}%, latency {}-{}ms, jitter {}ms",
            conditions.loss_percent,
            conditions.min_latency_ms,
            conditions.max_latency_ms,
            conditions.jitter_ms
        );
    }

    let sim = Rc::new(RefCell::new(BossSim::new(BOSS_HEALTH, args.drain)));
    let mut owner = World::new();
    owner.configure(Box::new(Leviathan::new(
        BOSS,
        Authority::Owner,
        ScriptedRig(sim.clone()),
        &config,
    )))?;
    let mut owner_session = Session::new(ManualClock::default(), config);

    let replica_rig = LoggingRig::new(BOSS_HEALTH);
    let observed = replica_rig.observed.clone();
    let mut replica = World::new();
    replica.configure(Box::new(Leviathan::new(
        BOSS,
        Authority::Replica,
        replica_rig,
        &config,
    )))?;
    let mut replica_session = Session::new(ManualClock::default(), config);

    let mut link = SimulatedLink::new(conditions, args.seed);
    let mut send_timer = FixedTimestep::new(owner_session.config().send_rate);
    let mut sequence: u32 = 0;
    let mut newest_sequence: Option<u32> = None;
    let mut reordered = 0u32;
    let mut markers = 0u32;

    let tick_rate = replica_session.config().tick_rate;
    let frame_dt = replica_session.config().tick_interval();
    let frames = (args.seconds * tick_rate as f64).ceil() as u64;
    log::info!("send {} Hz, tick {} Hz", send_timer.rate(), tick_rate);

    for frame in 1..=frames {
        let now = frame as f64 * frame_dt;

        sim.borrow_mut().update(frame_dt);
        owner_session.clock_mut().set(now);
        for _ in 0..send_timer.advance(frame_dt) {
            for envelope in owner.collect_snapshots(&owner_session) {
                let packet =
                    Packet::new(PacketHeader::new(sequence), PacketType::Snapshot(envelope));
                sequence = sequence.wrapping_add(1);
                link.send(&packet, now)?;
            }
        }
        if frame % (MARKER_PERIOD as u64 * tick_rate as u64) == 0 {
            let packet = Packet::new(
                PacketHeader::new(sequence),
                PacketType::Point {
                    player_id: 0,
                    position: [0.0, 0.0, frame as f32],
                    normal: [0.0, 1.0, 0.0],
                },
            );
            sequence = sequence.wrapping_add(1);
            link.send(&packet, now)?;
        }

        replica_session.clock_mut().set(now);
        for packet in link.receive(now)? {
            let seq = packet.header.sequence;
            match newest_sequence {
                Some(newest) if !sequence_greater_than(seq, newest) => reordered += 1,
                _ => newest_sequence = Some(seq),
            }

            match packet.payload {
                PacketType::Snapshot(envelope) => {
                    if let Err(err) = replica.on_snapshot_received(&replica_session, &envelope) {
                        log::trace!("snapshot #{seq}: {err}");
                    }
                }
                PacketType::Point { player_id, position, .. } => {
                    markers += 1;
                    log::debug!("player {player_id} marked {position:?}");
                }
            }
        }
        replica.tick(&replica_session);
    }

    let sim = sim.borrow();
    let observed = observed.borrow();
    let link_stats = link.stats();
    let owner_stats = owner.stats();
    let replica_stats = replica.stats();

    log::info!(
        "link: sent {} dropped {} delivered {} ({} bytes), {} out of order, {} still in flight",
        link_stats.sent,
        link_stats.dropped,
        link_stats.delivered,
        link_stats.bytes_sent,
        reordered,
        link.in_flight()
    );
    log::info!(
        "owner: sent {} snapshots, skipped {} writes",
        owner_stats.sent,
        owner_stats.skipped_writes
    );
    log::info!(
        "replica: decoded {}, stale {}, schema {}, other {}, markers {}",
        replica_stats.decoded,
        replica_stats.rejected_stale,
        replica_stats.rejected_schema,
        replica_stats.rejected_other,
        markers
    );
    log::info!(
        "bites: owner {} replica {}; repositions: owner {} replica {}",
        sim.bites,
        observed.bites,
        sim.repositions,
        observed.repositions
    );
    match observed.pose {
        Some(pose) => log::info!(
            "final pose: health {:.1} (owner {:.1}), head {:?}, max step {:.2}, defeated {}",
            pose.health,
            sim.health,
            pose.head,
            observed.max_step,
            pose.defeated
        ),
        None => log::warn!("replica never received a snapshot"),
    }
    if observed.simulated {
        log::warn!("replica rig was left simulating");
    }

    Ok(())
}
