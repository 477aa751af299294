use crate::ids::RescuerId;
use crate::status::RescuerStatus;

/// A field responder account. The password hash and profile image bytes
/// live behind the store and are never serialized with the profile.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rescuer {
    pub id: RescuerId,
    pub name: String,
    pub badge_id: String,
    pub callsign: String,
    pub phone: String,
    pub status: RescuerStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Registration payload. The password arrives in the clear over the request
/// body and is hashed before it ever reaches the store.
#[derive(Debug, Clone)]
pub struct NewRescuer {
    pub name: String,
    pub badge_id: String,
    pub callsign: String,
    pub phone: String,
    pub password: String,
    pub image: Option<Vec<u8>>,
}

/// Partial profile update. `image: None` means "keep the stored bytes",
/// never "clear them".
#[derive(Debug, Clone, Default)]
pub struct RescuerUpdate {
    pub name: Option<String>,
    pub badge_id: Option<String>,
    pub callsign: Option<String>,
    pub phone: Option<String>,
    pub image: Option<Vec<u8>>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    pub badge_id: String,
    pub password: String,
}

/// Position report pushed by a rescuer's device.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct RescuerLocation {
    #[serde(rename = "rescuerId")]
    pub rescuer_id: RescuerId,
    pub lat: f64,
    pub lon: f64,
}
