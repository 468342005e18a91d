use geoecho_core::metadata::ConnectionMetadata;
use worker::Cf;

/// Map the Worker `cf` object onto the connection metadata record.
///
/// `cf` carries no client address; `/api/location` takes it from `CF-Connecting-IP` instead.
pub fn metadata_from_cf(cf: &Cf) -> ConnectionMetadata {
    let (latitude, longitude) = match cf.coordinates() {
        Some((lat, lon)) => (Some(lat.to_string()), Some(lon.to_string())),
        None => (None, None),
    };

    ConnectionMetadata {
        country: cf.country(),
        city: cf.city(),
        region: cf.region(),
        latitude,
        longitude,
        timezone: non_empty(cf.timezone_name()),
        client_ip: None,
        ..ConnectionMetadata::default()
    }
    .with_extra("colo", non_empty(cf.colo()))
    .with_extra("asn", Some(cf.asn()))
    .with_extra("asOrganization", non_empty(cf.as_organization()))
    .with_extra("continent", cf.continent())
    .with_extra("postalCode", cf.postal_code())
    .with_extra("regionCode", cf.region_code())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
