//! Pseudonym generation.
//!
//! Two interchangeable strategies: a curated pool of obviously fictional
//! names per category, or type-prefixed random tokens such as
//! `person_3fa9c2d1`. Both produce plain text that needs no escaping inside
//! JSON strings. Pool entries are chosen so that none is a whole-word part of
//! another.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;

use crate::anonymization::entity::EntityCategory;

/// Upper bound on candidates tried for a single entity.
const MAX_ATTEMPTS: usize = 64;

const PERSON_NAMES: &[&str] = &[
    "Lord Voldemort",
    "Hermione Granger",
    "Yoda",
    "Frodo Baggins",
    "Bilbo Baggins",
    "Chewbacca",
    "Darth Vader",
    "Gandalf the Grey",
    "Indiana Jones",
    "Willy Wonka",
    "Sherlock Holmes",
    "Tony Stark",
    "Bruce Wayne",
    "Jack Sparrow",
    "Optimus Prime",
    "Rick Sanchez",
    "Homer Simpson",
    "SpongeBob SquarePants",
    "Scooby-Doo",
    "Bart Simpson",
    "Shrek",
    "Jon Snow",
    "Lara Croft",
    "Princess Leia",
    "Han Solo",
    "Boba Fett",
    "Marty McFly",
    "Katniss Everdeen",
    "Buzz Lightyear",
    "Spock",
    "Pikachu",
];

const ORGANIZATION_NAMES: &[&str] = &[
    "Stark Industries",
    "Wayne Enterprises",
    "Wonka Industries",
    "Umbrella Corp",
    "Cyberdyne Systems",
    "Initech",
    "Pied Piper",
    "Oscorp",
    "Dunder Mifflin",
    "Gringotts Bank",
    "Weyland-Yutani",
    "Bubba Gump Shrimp",
    "Krusty Krab",
    "Planet Express",
    "Aperture Science",
    "Black Mesa",
    "Buy n Large",
    "Vandelay Industries",
    "Tyrell Corporation",
    "LexCorp",
    "Soylent Corporation",
    "Virtucon",
    "Yoyodyne Propulsion Systems",
    "Globex Corporation",
    "Prestige Worldwide",
    "Dinoco",
    "Roxxon Corporation",
];

const LOCATION_NAMES: &[&str] = &[
    "Hogwarts",
    "Narnia",
    "Westeros",
    "Middle-Earth",
    "Asgard",
    "The Shire",
    "Gotham City",
    "Bikini Bottom",
    "Azkaban",
    "Mordor",
    "Rivendell",
    "Tatooine",
    "Hyrule",
    "Skyrim",
    "Jurassic Park",
    "Neverland",
    "Emerald City",
    "Cloud City",
    "Gallifrey",
    "Kings Landing",
    "Vice City",
    "Raccoon City",
    "Agrabah",
    "Duckburg",
    "Elbonia",
    "Genosha",
    "Kamino",
    "Sokovia",
    "Wakanda",
    "Themyscira",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PseudonymStrategy {
    #[default]
    Pool,
    Token,
}

impl FromStr for PseudonymStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pool" => Ok(PseudonymStrategy::Pool),
            "token" => Ok(PseudonymStrategy::Token),
            other => Err(format!("unknown pseudonym strategy '{other}' (expected pool|token)")),
        }
    }
}

impl fmt::Display for PseudonymStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PseudonymStrategy::Pool => write!(f, "pool"),
            PseudonymStrategy::Token => write!(f, "token"),
        }
    }
}

/// Per-session pseudonym source. Owns its RNG so sessions never share state.
pub struct PseudonymGenerator {
    strategy: PseudonymStrategy,
    rng: StdRng,
}

impl PseudonymGenerator {
    pub fn new(strategy: PseudonymStrategy) -> Self {
        Self {
            strategy,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(strategy: PseudonymStrategy, seed: u64) -> Self {
        Self {
            strategy,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produces a pseudonym for `category` that `is_taken` accepts, or `None`
    /// once the attempt budget is exhausted.
    pub fn generate<F>(&mut self, category: EntityCategory, is_taken: F) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        match (self.strategy, category) {
            (PseudonymStrategy::Pool, EntityCategory::Person) => self.from_pool(PERSON_NAMES, is_taken),
            (PseudonymStrategy::Pool, EntityCategory::Organization) => {
                self.from_pool(ORGANIZATION_NAMES, is_taken)
            }
            (PseudonymStrategy::Pool, EntityCategory::Location) => {
                self.from_pool(LOCATION_NAMES, is_taken)
            }
            (_, category) => self.token(category, is_taken),
        }
    }

    fn from_pool<F>(&mut self, pool: &[&str], is_taken: F) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        let free: Vec<&str> = pool.iter().copied().filter(|name| !is_taken(*name)).collect();
        if let Some(name) = free.choose(&mut self.rng) {
            return Some((*name).to_string());
        }

        // Pool exhausted: suffix a random base until the result is free.
        let base = pool.choose(&mut self.rng)?;
        (2..MAX_ATTEMPTS + 2)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !is_taken(candidate.as_str()))
    }

    fn token<F>(&mut self, category: EntityCategory, is_taken: F) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        (0..MAX_ATTEMPTS)
            .map(|_| format!("{}_{:08x}", category.token_prefix(), self.rng.gen::<u32>()))
            .find(|candidate| !is_taken(candidate.as_str()))
    }
}

/// True if `text` contains something shaped like a pseudonym from either
/// strategy (pool name, optionally suffixed, or a category token).
pub fn looks_like_pseudonym(text: &str) -> Result<bool, regex::Error> {
    Ok(pseudonym_shape()?.is_match(text))
}

/// Matcher over every pool name and token shape, compiled on first use.
fn pseudonym_shape() -> Result<&'static Regex, regex::Error> {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    if let Some(shape) = SHAPE.get() {
        return Ok(shape);
    }

    let pool = PERSON_NAMES
        .iter()
        .chain(ORGANIZATION_NAMES)
        .chain(LOCATION_NAMES)
        .map(|name| format!("{}(?:_[0-9]+)?", regex::escape(name)));
    let pattern = format!(
        r"(?i)\b(?:{}|(?:person|organization|location|entity)_[0-9a-f]{{8}})\b",
        pool.collect::<Vec<_>>().join("|")
    );
    let shape = Regex::new(&pattern)?;
    Ok(SHAPE.get_or_init(|| shape))
}
