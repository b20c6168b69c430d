//! Voter record model.
//!
//! Defines [`VoterRecord`], the twelve-field unit of data the rest of the crate
//! stores, filters, encodes and persists, together with [`Eligibility`] and the
//! age calculation used at data-entry time.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Number of fields in a voter record.
pub const FIELD_COUNT: usize = 12;

/// Age at which a voter becomes eligible.
pub const VOTING_AGE: i32 = 18;

/// Date format of [`VoterRecord::date_of_birth`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Human-readable field labels, in record field order.
pub const FIELD_LABELS: [&str; FIELD_COUNT] = [
    "Name",
    "DOB",
    "Age",
    "Eligibility",
    "Voter ID",
    "Phone",
    "District",
    "City",
    "Area",
    "Street",
    "Pincode",
    "Address",
];

/// A single voter's captured data.
///
/// Every field is a string and may be empty. `age` is numeric text and
/// `eligibility` is normally `"Yes"` or `"No"`, but neither is re-checked when
/// a record is stored: imported and persisted data is kept exactly as given.
/// Use [`VoterRecord::eligibility`] for the typed view.
///
/// The serialized form uses the key names of the browser storage slot the
/// data originally lived in (`dob`, `voterId`, ...). Missing keys and `null`
/// values read as empty strings, and numbers or booleans as their text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoterRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "dob", deserialize_with = "lenient_string")]
    pub date_of_birth: String,
    #[serde(deserialize_with = "lenient_string")]
    pub age: String,
    #[serde(deserialize_with = "lenient_string")]
    pub eligibility: String,
    #[serde(deserialize_with = "lenient_string")]
    pub voter_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub district: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(deserialize_with = "lenient_string")]
    pub area: String,
    #[serde(deserialize_with = "lenient_string")]
    pub street: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pincode: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
}

impl VoterRecord {
    /// Returns the fields in their fixed positional order:
    /// name, dob, age, eligibility, voter id, phone, district, city, area,
    /// street, pincode, address.
    pub fn fields(&self) -> [&str; FIELD_COUNT] {
        [
            &self.name,
            &self.date_of_birth,
            &self.age,
            &self.eligibility,
            &self.voter_id,
            &self.phone,
            &self.district,
            &self.city,
            &self.area,
            &self.street,
            &self.pincode,
            &self.address,
        ]
    }

    /// Builds a record from positional fields.
    ///
    /// Missing trailing fields become empty strings and extra fields are
    /// ignored.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut it = fields.into_iter();
        let mut next = || it.next().unwrap_or_default();
        Self {
            name: next(),
            date_of_birth: next(),
            age: next(),
            eligibility: next(),
            voter_id: next(),
            phone: next(),
            district: next(),
            city: next(),
            area: next(),
            street: next(),
            pincode: next(),
            address: next(),
        }
    }

    /// Parses the eligibility field, if it holds `Yes` or `No`.
    pub fn eligibility(&self) -> Option<Eligibility> {
        self.eligibility.parse().ok()
    }

    /// Returns true if any field, lower-cased, contains `needle`.
    ///
    /// `needle` must already be lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        self.fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    /// Fills `age` and `eligibility` from `date_of_birth` as of `today`.
    ///
    /// This is the data-entry convenience; the two fields stay editable
    /// afterwards and are not re-derived on save.
    pub fn derive_age_and_eligibility(&mut self, today: NaiveDate) -> Result<(), ValidationError> {
        let dob = parse_date_of_birth(&self.date_of_birth)?;
        if dob > today {
            return Err(ValidationError::FutureDate(self.date_of_birth.clone()));
        }
        let age = derive_age(dob, today);
        self.age = age.to_string();
        self.eligibility = Eligibility::from_age(age).to_string();
        Ok(())
    }
}

/// A stored field value as older snapshots may hold it.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Flag(bool),
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StoredValue>::deserialize(deserializer)? {
        None => String::new(),
        Some(StoredValue::Text(text)) => text,
        Some(StoredValue::Integer(n)) => n.to_string(),
        Some(StoredValue::Number(n)) => n.to_string(),
        Some(StoredValue::Flag(b)) => b.to_string(),
    })
}

/// Whether a voter is eligible to vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Eligibility {
    Yes,
    No,
}

impl Eligibility {
    /// `Yes` at or above the voting age, otherwise `No`.
    pub fn from_age(age: i32) -> Self {
        if age >= VOTING_AGE {
            Eligibility::Yes
        } else {
            Eligibility::No
        }
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::Yes => write!(f, "Yes"),
            Eligibility::No => write!(f, "No"),
        }
    }
}

impl FromStr for Eligibility {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Eligibility::Yes),
            "no" => Ok(Eligibility::No),
            _ => Err(ValidationError::InvalidEligibility(s.to_string())),
        }
    }
}

/// Parses a `YYYY-MM-DD` date of birth.
pub fn parse_date_of_birth(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

/// Completed years between `dob` and `today`.
///
/// The year difference is reduced by one until the birthday has been reached
/// in `today`'s year. A 29 February birthday counts as reached on 1 March in
/// non-leap years.
pub fn derive_age(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fields_order_round_trips_through_from_fields() {
        let record = VoterRecord::from_fields((1..=12).map(|i| format!("f{}", i)));
        assert_eq!(record.name, "f1");
        assert_eq!(record.date_of_birth, "f2");
        assert_eq!(record.voter_id, "f5");
        assert_eq!(record.address, "f12");
        let again = VoterRecord::from_fields(record.fields().iter().map(|f| f.to_string()));
        assert_eq!(again, record);
    }

    #[test]
    fn test_from_fields_defaults_missing_address() {
        let record = VoterRecord::from_fields((1..=11).map(|i| i.to_string()));
        assert_eq!(record.pincode, "11");
        assert_eq!(record.address, "");
    }

    #[test]
    fn test_age_exactly_eighteen_is_eligible() {
        let today = date(2024, 6, 15);
        let mut record = VoterRecord {
            date_of_birth: "2006-06-15".to_string(),
            ..Default::default()
        };
        record.derive_age_and_eligibility(today).unwrap();
        assert_eq!(record.age, "18");
        assert_eq!(record.eligibility, "Yes");
    }

    #[test]
    fn test_age_one_day_short_is_not_eligible() {
        let today = date(2024, 6, 15);
        let mut record = VoterRecord {
            date_of_birth: "2006-06-16".to_string(),
            ..Default::default()
        };
        record.derive_age_and_eligibility(today).unwrap();
        assert_eq!(record.age, "17");
        assert_eq!(record.eligibility, "No");
    }

    #[test]
    fn test_leap_day_birthday() {
        let dob = date(2004, 2, 29);
        assert_eq!(derive_age(dob, date(2022, 2, 28)), 17);
        assert_eq!(derive_age(dob, date(2022, 3, 1)), 18);
        assert_eq!(derive_age(dob, date(2024, 2, 29)), 20);
    }

    #[test]
    fn test_future_date_of_birth_rejected() {
        let mut record = VoterRecord {
            date_of_birth: "2030-01-01".to_string(),
            ..Default::default()
        };
        let err = record
            .derive_age_and_eligibility(date(2024, 1, 1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::FutureDate(_)));
    }

    #[test]
    fn test_invalid_date_of_birth_rejected() {
        assert!(matches!(
            parse_date_of_birth("15/06/2006"),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_eligibility_parsing() {
        assert_eq!("Yes".parse::<Eligibility>().unwrap(), Eligibility::Yes);
        assert_eq!(" no ".parse::<Eligibility>().unwrap(), Eligibility::No);
        assert!("maybe".parse::<Eligibility>().is_err());
        assert_eq!(Eligibility::from_age(17), Eligibility::No);
        assert_eq!(Eligibility::from_age(18), Eligibility::Yes);
    }

    #[test]
    fn test_matches_any_field_case_insensitive() {
        let record = VoterRecord {
            name: "Alice".to_string(),
            district: "Smithtown".to_string(),
            ..Default::default()
        };
        assert!(record.matches("smith"));
        assert!(record.matches("alice"));
        assert!(!record.matches("bob"));
    }

    #[test]
    fn test_json_uses_storage_key_names() {
        let record = VoterRecord {
            name: "Alice".to_string(),
            date_of_birth: "2000-01-01".to_string(),
            voter_id: "ABC123".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["dob"], "2000-01-01");
        assert_eq!(json["voterId"], "ABC123");
    }

    #[test]
    fn test_json_missing_keys_default_to_empty() {
        let record: VoterRecord = serde_json::from_str(r#"{"name":"Bob"}"#).unwrap();
        assert_eq!(record.name, "Bob");
        assert_eq!(record.address, "");
    }

    #[test]
    fn test_json_null_and_numbers_read_as_text() {
        let record: VoterRecord = serde_json::from_str(
            r#"{"name":"Alice","dob":"1990-01-01","age":34,"address":null,"pincode":12345}"#,
        )
        .unwrap();
        assert_eq!(record.age, "34");
        assert_eq!(record.address, "");
        assert_eq!(record.pincode, "12345");
    }
}
