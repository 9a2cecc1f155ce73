use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde uses the same string values as the database columns, so JSON
/// payloads and column values never disagree.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(SessionStatus {
    Active => "active",
    Closed => "closed",
});

str_enum!(ParticipantRole {
    Primary => "primary",
    Referred => "referred",
});

str_enum!(SenderType {
    Patient => "patient",
    Doctor => "doctor",
    System => "system",
});

str_enum!(MessageKind {
    Text => "text",
    Voice => "voice",
    Prescription => "prescription",
    Referral => "referral",
    Upload => "upload",
    System => "system",
});

str_enum!(ReferralStatus {
    Pending => "pending",
    Accepted => "accepted",
});

str_enum!(SystemEvent {
    SessionCreated => "session_created",
    DoctorJoined => "doctor_joined",
    ReferralCreated => "referral_created",
    SessionClosed => "session_closed",
});

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
    PreferNotToSay => "prefer_not_to_say",
});

str_enum!(BloodType {
    APositive => "A+",
    ANegative => "A-",
    BPositive => "B+",
    BNegative => "B-",
    AbPositive => "AB+",
    AbNegative => "AB-",
    OPositive => "O+",
    ONegative => "O-",
    Unknown => "unknown",
});

str_enum!(LanguageHint {
    English => "en",
    Hindi => "hi",
    Hinglish => "hinglish",
});

str_enum!(FileKind {
    Image => "image",
    Pdf => "pdf",
    Other => "other",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn session_status_round_trip() {
        for (variant, s) in [
            (SessionStatus::Active, "active"),
            (SessionStatus::Closed, "closed"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(SessionStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn sender_type_round_trip() {
        for (variant, s) in [
            (SenderType::Patient, "patient"),
            (SenderType::Doctor, "doctor"),
            (SenderType::System, "system"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(SenderType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn message_kind_round_trip() {
        for (variant, s) in [
            (MessageKind::Text, "text"),
            (MessageKind::Voice, "voice"),
            (MessageKind::Prescription, "prescription"),
            (MessageKind::Referral, "referral"),
            (MessageKind::Upload, "upload"),
            (MessageKind::System, "system"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(MessageKind::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn system_event_round_trip() {
        for (variant, s) in [
            (SystemEvent::SessionCreated, "session_created"),
            (SystemEvent::DoctorJoined, "doctor_joined"),
            (SystemEvent::ReferralCreated, "referral_created"),
            (SystemEvent::SessionClosed, "session_closed"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(SystemEvent::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn blood_type_keeps_sign_characters() {
        assert_eq!(BloodType::APositive.as_str(), "A+");
        assert_eq!(BloodType::from_str("AB-").unwrap(), BloodType::AbNegative);
        assert_eq!(BloodType::from_str("unknown").unwrap(), BloodType::Unknown);
    }

    #[test]
    fn serde_uses_database_strings() {
        let json = serde_json::to_string(&SystemEvent::DoctorJoined).unwrap();
        assert_eq!(json, "\"doctor_joined\"");
        let hint: LanguageHint = serde_json::from_str("\"hinglish\"").unwrap();
        assert_eq!(hint, LanguageHint::Hinglish);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(SessionStatus::from_str("archived").is_err());
        assert!(ReferralStatus::from_str("expired").is_err());
        assert!(Gender::from_str("").is_err());
    }
}
