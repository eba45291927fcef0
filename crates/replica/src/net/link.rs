use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::protocol::{Packet, PacketError};

/// Delivery of packets between peers. Real transports live outside this
/// crate; the core only needs these two calls.
pub trait Transport {
    fn send(&mut self, packet: &Packet, now: f64) -> Result<(), PacketError>;

    fn receive(&mut self, now: f64) -> Result<Vec<Packet>, PacketError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinkConditions {
    pub loss_percent: f32,
    pub min_latency_ms: u32,
    pub max_latency_ms: u32,
    pub jitter_ms: u32,
}

impl LinkConditions {
    pub fn is_perfect(&self) -> bool {
        self.loss_percent <= 0.0 && self.max_latency_ms == 0 && self.jitter_ms == 0
    }

    fn should_drop(&self, rng: &mut StdRng) -> bool {
        self.loss_percent > 0.0 && rng.gen_range(0.0..100.0) < self.loss_percent
    }

    fn delay_ms(&self, rng: &mut StdRng) -> u32 {
        let base = self.min_latency_ms;
        let range = self.max_latency_ms.saturating_sub(self.min_latency_ms);
        let spread = if range > 0 { rng.gen_range(0..=range) } else { 0 };
        let jitter = if self.jitter_ms > 0 {
            rng.gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        base + spread + jitter
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub sent: u64,
    pub dropped: u64,
    pub delivered: u64,
    pub bytes_sent: u64,
}

#[derive(Debug)]
struct InFlight {
    release_time: f64,
    order: u64,
    bytes: Vec<u8>,
}

impl PartialEq for InFlight {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for InFlight {}

impl PartialOrd for InFlight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InFlight {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on release time, FIFO among equals
        other
            .release_time
            .total_cmp(&self.release_time)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// In-memory one-way link with loss, latency and jitter. Jitter larger than
/// the send interval reorders packets.
#[derive(Debug)]
pub struct SimulatedLink {
    conditions: LinkConditions,
    rng: StdRng,
    in_flight: BinaryHeap<InFlight>,
    next_order: u64,
    stats: LinkStats,
}

impl SimulatedLink {
    pub fn new(conditions: LinkConditions, seed: u64) -> Self {
        Self {
            conditions,
            rng: StdRng::seed_from_u64(seed),
            in_flight: BinaryHeap::new(),
            next_order: 0,
            stats: LinkStats::default(),
        }
    }

    pub fn perfect() -> Self {
        Self::new(LinkConditions::default(), 0)
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

impl Transport for SimulatedLink {
    fn send(&mut self, packet: &Packet, now: f64) -> Result<(), PacketError> {
        let bytes = packet.serialize()?;
        self.stats.sent += 1;
        self.stats.bytes_sent += bytes.len() as u64;

        if self.conditions.should_drop(&mut self.rng) {
            self.stats.dropped += 1;
            return Ok(());
        }

        let delay = self.conditions.delay_ms(&mut self.rng) as f64 / 1000.0;
        self.in_flight.push(InFlight {
            release_time: now + delay,
            order: self.next_order,
            bytes,
        });
        self.next_order += 1;
        Ok(())
    }

    fn receive(&mut self, now: f64) -> Result<Vec<Packet>, PacketError> {
        let mut packets = Vec::new();
        while self
            .in_flight
            .peek()
            .is_some_and(|next| next.release_time <= now)
        {
            if let Some(delivered) = self.in_flight.pop() {
                packets.push(Packet::deserialize(&delivered.bytes)?);
                self.stats.delivered += 1;
            }
        }
        Ok(packets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::protocol::{PacketHeader, PacketType};

    fn point(sequence: u32) -> Packet {
        Packet::new(
            PacketHeader::new(sequence),
            PacketType::Point {
                player_id: 1,
                position: [sequence as f32, 0.0, 0.0],
                normal: [0.0, 1.0, 0.0],
            },
        )
    }

    #[test]
    fn perfect_link_delivers_in_order() {
        let mut link = SimulatedLink::perfect();
        for sequence in 0..5 {
            link.send(&point(sequence), 1.0).unwrap();
        }

        let received = link.receive(1.0).unwrap();
        let sequences: Vec<u32> = received.iter().map(|p| p.header.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3, 4]);
        assert_eq!(link.stats().delivered, 5);
    }

    #[test]
    fn default_conditions_are_perfect() {
        assert!(LinkConditions::default().is_perfect());
        let lossy = LinkConditions {
            loss_percent: 5.0,
            ..Default::default()
        };
        assert!(!lossy.is_perfect());
    }

    #[test]
    fn latency_holds_packets_back() {
        let conditions = LinkConditions {
            min_latency_ms: 100,
            max_latency_ms: 100,
            ..Default::default()
        };
        let mut link = SimulatedLink::new(conditions, 1);
        link.send(&point(0), 0.0).unwrap();

        assert!(link.receive(0.05).unwrap().is_empty());
        assert_eq!(link.receive(0.1).unwrap().len(), 1);
    }

    #[test]
    fn total_loss_drops_everything() {
        let conditions = LinkConditions {
            loss_percent: 100.0,
            ..Default::default()
        };
        let mut link = SimulatedLink::new(conditions, 7);
        for sequence in 0..20 {
            link.send(&point(sequence), 0.0).unwrap();
        }

        assert!(link.receive(10.0).unwrap().is_empty());
        assert_eq!(link.stats().dropped, 20);
        assert_eq!(link.in_flight(), 0);
    }

    #[test]
    fn same_seed_same_fate() {
        let conditions = LinkConditions {
            loss_percent: 30.0,
            min_latency_ms: 10,
            max_latency_ms: 80,
            jitter_ms: 40,
        };
        let run = |seed| {
            let mut link = SimulatedLink::new(conditions, seed);
            for sequence in 0..50 {
                link.send(&point(sequence), sequence as f64 * 0.01).unwrap();
            }
            link.receive(100.0)
                .unwrap()
                .iter()
                .map(|p| p.header.sequence)
                .collect::<Vec<_>>()
        };

        assert_eq!(run(42), run(42));
    }
}
