use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::credentials::AuthKind;

/// The closed set of supported advertising networks.
///
/// Parsing is case-insensitive; display and serialization use the lowercase name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Network {
    BigOAds,
    Mintegral,
    Pangle,
    IronSource,
    InMobi,
    Fyber,
    Unity,
    AppLovin,
    Vungle,
}

impl Network {
    /// All networks in declaration order.
    pub fn all() -> Vec<Network> {
        Network::iter().collect()
    }

    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Human-readable name used in log lines and CLI output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::BigOAds => "BigOAds",
            Self::Mintegral => "Mintegral",
            Self::Pangle => "Pangle",
            Self::IronSource => "IronSource",
            Self::InMobi => "InMobi",
            Self::Fyber => "Fyber",
            Self::Unity => "Unity",
            Self::AppLovin => "AppLovin",
            Self::Vungle => "Vungle",
        }
    }

    pub fn auth_kind(&self) -> AuthKind {
        match self {
            Self::BigOAds | Self::Mintegral | Self::Pangle => AuthKind::HmacPreShared,
            Self::IronSource | Self::Vungle => AuthKind::RefreshableBearer,
            Self::Fyber => AuthKind::OAuthClientCredentials,
            Self::Unity => AuthKind::BasicAuth,
            Self::InMobi | Self::AppLovin => AuthKind::StaticHeaderKey,
        }
    }

    /// Secret fields that must be present for the network to be usable.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::BigOAds => &["developer_id", "token"],
            Self::Mintegral => &["skey", "secret"],
            Self::Pangle => &["security_key", "user_id", "role_id"],
            Self::IronSource => &["secret_key", "refresh_token"],
            Self::InMobi => &["client_id", "account_id", "client_secret"],
            Self::Fyber => &["client_id", "client_secret"],
            Self::Unity => &["key_id", "secret_key", "organization_id"],
            Self::AppLovin => &["api_key"],
            Self::Vungle => &["secret_token"],
        }
    }

    /// Environment variable name for one of this network's secret fields,
    /// e.g. `BIGOADS_DEVELOPER_ID`.
    pub fn env_key(&self, field: &str) -> String {
        format!("{}_{}", self.as_str(), field).to_ascii_uppercase()
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::BigOAds => "https://www.bigossp.com",
            Self::Mintegral => "https://dev.mintegral.com",
            Self::Pangle => "https://open-api.pangleglobal.com",
            Self::IronSource => "https://platform.ironsrc.com",
            Self::InMobi => "https://publisher.inmobi.com",
            Self::Fyber => "https://console.fyber.com",
            Self::Unity => "https://services.api.unity.com/monetize/v1",
            Self::AppLovin => "https://o.applovin.com/mediation/v1",
            Self::Vungle => "https://publisher-api.vungle.com",
        }
    }

    /// Token endpoint for networks with a refreshable token.
    pub fn default_auth_url(&self) -> Option<&'static str> {
        match self {
            Self::IronSource => Some("https://platform.ironsrc.com/partners/publisher/auth"),
            Self::Fyber => Some("https://console.fyber.com/api/v2/management/auth"),
            Self::Vungle => Some("https://auth-api.vungle.com/v2/auth"),
            _ => None,
        }
    }
}
