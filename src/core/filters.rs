use crate::models::{Listing, PreferenceProfile};

/// Check if a listing satisfies the profile's hard requirements
///
/// Used only for strict ranking. A listing with an unknown price, bedroom or
/// bathroom count cannot be shown to meet the requirement and is rejected.
#[inline]
pub fn meets_hard_requirements(listing: &Listing, profile: &PreferenceProfile) -> bool {
    // Check budget ceiling
    match listing.price {
        Some(price) if price <= profile.budget_max => {}
        _ => return false,
    }

    // Check bedrooms
    if profile.min_bedrooms > 0 {
        match listing.bedrooms {
            Some(beds) if beds >= profile.min_bedrooms => {}
            _ => return false,
        }
    }

    // Check bathrooms
    if profile.min_bathrooms > 0.0 {
        match listing.bathrooms {
            Some(baths) if baths >= profile.min_bathrooms => {}
            _ => return false,
        }
    }

    true
}

/// Split a "City, ST" label into trimmed city and state parts
///
/// Splits on the last comma so city names containing commas survive.
pub fn parse_location_label(label: &str) -> Option<(&str, &str)> {
    let (city, state) = label.rsplit_once(',')?;
    let (city, state) = (city.trim(), state.trim());
    if city.is_empty() || state.is_empty() {
        return None;
    }
    Some((city, state))
}

/// Check if a listing is in one of the requested "City, ST" locations
///
/// City and state compare case-insensitively, ignoring spacing around the
/// comma. An empty filter accepts every listing; malformed labels match none.
#[inline]
pub fn matches_location_filter(listing: &Listing, locations: &[String]) -> bool {
    if locations.is_empty() {
        return true;
    }

    let (city, state) = (listing.city.trim(), listing.state.trim());
    locations.iter().filter_map(|l| parse_location_label(l)).any(|(c, st)| {
        c.eq_ignore_ascii_case(city) && st.eq_ignore_ascii_case(state)
    })
}
