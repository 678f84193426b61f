//! # Thalamus Subscriptions
//!
//! Topics the thalamus boundary listens on for each watched scope:
//!
//! ```text
//! /A/driver/{lvl}/{scope}/nucleus/{n}      driver envelopes
//! /B/modulator/{lvl}/{scope}/nucleus/{n}   modulator envelopes
//! /G/modulator/{lvl}/{scope}/nucleus/{n}   direct gate installs
//! /D/driver/{lvl}/{scope}                  relay bundles
//! /D/modulator/{lvl}/{scope}               global broadcasts
//! ```

use shared_types::topics::{lane_topic, nucleus_topic};
use shared_types::{ContractError, Lane, SignalKind};

use crate::container::WatchedScope;

const ADDRESSED_LANES: [(Lane, SignalKind); 3] = [
    (Lane::Driver, SignalKind::Driver),
    (Lane::Modulator, SignalKind::Modulator),
    (Lane::Gate, SignalKind::Modulator),
];

/// Every topic the thalamus boundary subscribes to, grouped by scope.
pub fn thalamus_topics(
    scopes: &[WatchedScope],
    nuclei: &[String],
) -> Result<Vec<String>, ContractError> {
    let mut topics = Vec::with_capacity(scopes.len() * (nuclei.len() * ADDRESSED_LANES.len() + 2));
    for watched in scopes {
        for nucleus in nuclei {
            for (lane, kind) in ADDRESSED_LANES {
                topics.push(nucleus_topic(
                    lane,
                    kind,
                    watched.scope_level,
                    &watched.scope,
                    nucleus,
                )?);
            }
        }
        topics.push(lane_topic(Lane::Global, SignalKind::Driver, watched.scope_level, &watched.scope)?);
        topics.push(lane_topic(
            Lane::Global,
            SignalKind::Modulator,
            watched.scope_level,
            &watched.scope,
        )?);
    }
    Ok(topics)
}
