//! Seeded multi-stream randomness for the simulation.
//!
//! Each subsystem draws from its own stream so that adding draws to one
//! subsystem never shifts the sequence observed by another. Stream seeds are
//! derived from the user seed with HMAC-SHA256 domain separation.

use std::cell::{RefCell, RefMut};

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Per-subsystem RNG streams for the tick loop.
#[derive(Debug)]
pub struct RngBundle {
    spawn: RefCell<CountingRng<SmallRng>>,
    weather: RefCell<CountingRng<SmallRng>>,
    incident: RefCell<CountingRng<SmallRng>>,
    economy: RefCell<CountingRng<SmallRng>>,
    lobby: RefCell<CountingRng<SmallRng>>,
    mission: RefCell<CountingRng<SmallRng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            spawn: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"spawn"))),
            weather: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"weather"))),
            incident: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"incident"))),
            economy: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"economy"))),
            lobby: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"lobby"))),
            mission: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"mission"))),
        }
    }

    /// Access the visitor-spawn RNG stream.
    #[must_use]
    pub fn spawn(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.spawn.borrow_mut()
    }

    /// Access the weather RNG stream.
    #[must_use]
    pub fn weather(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.weather.borrow_mut()
    }

    /// Access the incident RNG stream.
    #[must_use]
    pub fn incident(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.incident.borrow_mut()
    }

    /// Access the economy RNG stream.
    #[must_use]
    pub fn economy(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.economy.borrow_mut()
    }

    /// Access the lobby RNG stream.
    #[must_use]
    pub fn lobby(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.lobby.borrow_mut()
    }

    /// Access the mission/event RNG stream.
    #[must_use]
    pub fn mission(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.mission.borrow_mut()
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes())
        .expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}
