//! Splitting amounts into round denominations
//!
//! Outputs of round amounts blend in with everyone else's, which makes them good ring
//! members later on.

use serde::{Deserialize, Serialize};

use common::Address;

use crate::TXDestination;

/// Splits `amount` into its non-zero decimal digits, each scaled by its order of magnitude
///
/// Starting from the lowest digit, digits are accumulated as dust for as long as the total
/// stays within `dust_threshold`. The dust, if any, is handed to `dust_handler` right before
/// the first digit that doesn't fit. Every remaining digit goes to `chunk_handler`, smallest
/// first.
pub fn decompose_amount_into_digits<C, D>(
    amount: u64,
    dust_threshold: u64,
    mut chunk_handler: C,
    mut dust_handler: D,
) where
    C: FnMut(u64),
    D: FnMut(u64),
{
    let mut rest = amount;
    let mut order: u64 = 1;
    let mut dust: u64 = 0;
    let mut is_dust_handled = false;

    while rest != 0 {
        let chunk = (rest % 10) * order;
        rest /= 10;
        order = order.saturating_mul(10);

        if !is_dust_handled && dust.saturating_add(chunk) <= dust_threshold {
            dust += chunk;
        } else {
            if !is_dust_handled {
                if dust != 0 {
                    dust_handler(dust);
                }
                is_dust_handled = true;
            }
            if chunk != 0 {
                chunk_handler(chunk);
            }
        }
    }

    if !is_dust_handled && dust != 0 {
        dust_handler(dust);
    }
}

/// What happens to the dust split off the change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DustPolicy {
    /// The dust is left over and paid as fee
    AddToFee,
    /// The dust is paid to the given address as a single output
    SendTo(Address),
}

/// Splits every destination and the change into digit outputs
///
/// Destinations keep their own dust as an extra output. The dust of the change is handled
/// according to `dust_policy`.
///
/// # Returns
/// The split destinations and the dust split off the change
pub fn split_destinations(
    destinations: &[TXDestination],
    change: &TXDestination,
    dust_threshold: u64,
    dust_policy: &DustPolicy,
) -> (Vec<TXDestination>, u64) {
    let mut splitted = Vec::new();
    for destination in destinations {
        let mut chunks = Vec::new();
        let mut dust = 0;
        decompose_amount_into_digits(
            destination.amount,
            dust_threshold,
            |chunk| chunks.push(chunk),
            |amount| dust = amount,
        );
        if dust != 0 {
            chunks.insert(0, dust);
        }
        splitted.extend(chunks.into_iter().map(|amount| TXDestination {
            amount,
            address: destination.address,
        }));
    }

    let mut change_dust = 0;
    decompose_amount_into_digits(
        change.amount,
        dust_threshold,
        |chunk| {
            splitted.push(TXDestination {
                amount: chunk,
                address: change.address,
            })
        },
        |dust| change_dust = dust,
    );

    if let (DustPolicy::SendTo(address), true) = (dust_policy, change_dust != 0) {
        splitted.push(TXDestination {
            amount: change_dust,
            address: *address,
        });
    }

    (splitted, change_dust)
}
