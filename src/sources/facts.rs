//! Headline sources

use super::templates::pick_index;
use super::Topic;
use crate::Result;

/// Produces one short headline for a topic.
pub trait FactSource: Send + Sync {
    fn fact(&self, topic: Topic, seed: &[u8]) -> Result<String>;
}

const GENERAL: &[&str] = &[
    "OCTOPUSES HAVE THREE HEARTS AND BLUE BLOOD",
    "HONEY NEVER EXPIRES - 3000 YEAR OLD HONEY IS STILL EDIBLE",
    "BANANAS ARE BERRIES BUT STRAWBERRIES AREN'T",
    "A GROUP OF FLAMINGOS IS CALLED A 'FLAMBOYANCE'",
    "SHARKS HAVE BEEN AROUND LONGER THAN TREES",
];

const REAL_ESTATE: &[&str] = &[
    "WORLD'S MOST EXPENSIVE HOME COSTS MORE THAN SOME COUNTRIES' GDP",
    "TOKYO APARTMENTS SELL FOR LESS THAN A CAR",
    "MONACO HAS THE HIGHEST PROPERTY PRICES PER SQUARE METER GLOBALLY",
    "NEW YORK'S CENTRAL PARK IS WORTH MORE THAN ENTIRE COUNTRIES",
    "DUBAI BUILDS A NEW SKYSCRAPER EVERY 3 DAYS ON AVERAGE",
];

const YACHTS: &[&str] = &[
    "WORLD'S LARGEST YACHT HAS ITS OWN SUBMARINE GARAGE",
    "BILLIONAIRE'S YACHT COSTS $1 MILLION PER WEEK TO MAINTAIN",
    "SOME LUXURY YACHTS HAVE THEIR OWN HELICOPTER LANDING PADS",
    "THE MOST EXPENSIVE YACHT EVER SOLD COST $4.8 BILLION",
    "MEGA YACHTS CONSUME MORE FUEL THAN SMALL TOWNS",
];

/// Built-in sample headlines, five per topic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleFacts;

impl SampleFacts {
    pub fn new() -> Self {
        SampleFacts
    }

    pub fn facts(topic: Topic) -> &'static [&'static str] {
        match topic {
            Topic::General => GENERAL,
            Topic::RealEstate => REAL_ESTATE,
            Topic::Yachts => YACHTS,
        }
    }
}

impl FactSource for SampleFacts {
    fn fact(&self, topic: Topic, seed: &[u8]) -> Result<String> {
        let facts = Self::facts(topic);
        Ok(facts[pick_index(seed, facts.len())].to_string())
    }
}
