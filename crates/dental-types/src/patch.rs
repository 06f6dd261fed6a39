//! Tri-state field wrapper for partial updates.
//!
//! A JSON update body can say three different things about a field:
//!
//! ```text
//! {}                      -> Patch::Absent    leave the stored value alone
//! {"notes": null}         -> Patch::Null      clear the stored value
//! {"notes": ""}           -> Patch::Value("") overwrite, even with an empty/zero value
//! ```
//!
//! Fields must be declared with `#[serde(default)]` so that a missing key becomes
//! [`Patch::Absent`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(v),
        }
    }

    /// Returns the new value, if one was supplied.
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)),
        }
    }

    /// Like [`Patch::map`] but for fallible conversions.
    pub fn try_map<U, E, F: FnOnce(T) -> Result<U, E>>(self, f: F) -> Result<Patch<U>, E> {
        Ok(match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)?),
        })
    }

    /// Writes the patch into a nullable slot.
    pub fn apply_to_option(self, slot: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *slot = None,
            Patch::Value(v) => *slot = Some(v),
        }
    }

    /// Writes the patch into a non-nullable slot.
    ///
    /// # Errors
    ///
    /// Returns [`NullNotAllowed`] if the patch is [`Patch::Null`]; the slot is left untouched.
    pub fn apply_to(self, slot: &mut T) -> Result<(), NullNotAllowed> {
        match self {
            Patch::Absent => Ok(()),
            Patch::Null => Err(NullNotAllowed),
            Patch::Value(v) => {
                *slot = v;
                Ok(())
            }
        }
    }

    /// Rejects [`Patch::Null`] for columns that cannot hold NULL.
    pub fn require_non_null(&self, field: &'static str) -> Result<(), NullField> {
        match self {
            Patch::Null => Err(NullField(field)),
            _ => Ok(()),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("value cannot be null")]
pub struct NullNotAllowed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} cannot be null")]
pub struct NullField(pub &'static str);

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        notes: Patch<String>,
        #[serde(default)]
        amount: Patch<f64>,
    }

    #[test]
    fn test_missing_key_is_absent() {
        let body: Body = serde_json::from_str("{}").expect("should parse");
        assert_eq!(body.notes, Patch::Absent);
        assert_eq!(body.amount, Patch::Absent);
    }

    #[test]
    fn test_null_and_zero_values_are_distinct() {
        let body: Body =
            serde_json::from_str(r#"{"notes": null, "amount": 0}"#).expect("should parse");
        assert_eq!(body.notes, Patch::Null);
        assert_eq!(body.amount, Patch::Value(0.0));
    }

    #[test]
    fn test_empty_string_is_a_value() {
        let body: Body = serde_json::from_str(r#"{"notes": ""}"#).expect("should parse");
        assert_eq!(body.notes, Patch::Value(String::new()));
    }

    #[test]
    fn test_apply_to_rejects_null_and_keeps_slot() {
        let mut slot = "kept".to_string();
        assert_eq!(Patch::Null.apply_to(&mut slot), Err(NullNotAllowed));
        assert_eq!(slot, "kept");
        Patch::Value("new".to_string())
            .apply_to(&mut slot)
            .expect("value should apply");
        assert_eq!(slot, "new");
    }

    #[test]
    fn test_apply_to_option_clears() {
        let mut slot = Some(3);
        Patch::Absent.apply_to_option(&mut slot);
        assert_eq!(slot, Some(3));
        Patch::Null.apply_to_option(&mut slot);
        assert_eq!(slot, None);
    }
}
