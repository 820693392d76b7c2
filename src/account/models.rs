//! Data models for the account ledger

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned account identity (`accounts.id`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct AccountId(pub i32);

impl AccountId {
    #[inline]
    pub fn get(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<i32> for AccountId {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

/// Server-assigned person identity (`people.id`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct PersonId(pub i32);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account owner. The name is only a lookup key and is not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
}

/// Account with its owner joined in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: Decimal,
    pub owner: Person,
}

impl Account {
    pub fn owner_name(&self) -> &str {
        &self.owner.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_id_parse() {
        assert_eq!("42".parse::<AccountId>().unwrap(), AccountId(42));
        assert_eq!(" 7 ".parse::<AccountId>().unwrap(), AccountId(7));
        assert!("abc".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_account_serializes_balance_exactly() {
        let account = Account {
            id: AccountId(1),
            balance: dec!(1000.00),
            owner: Person {
                id: PersonId(3),
                name: "John Smith".to_string(),
            },
        };

        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["balance"], "1000.00");
        assert_eq!(json["owner"]["name"], "John Smith");
        assert_eq!(account.owner_name(), "John Smith");
    }
}
