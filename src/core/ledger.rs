//! Entities tracked in the user's ledger.
use crate::core::conversion::{BalanceItem, convert};
use crate::core::currency::normalize_code;
use crate::core::rates::RateTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// A record stored in its own collection and addressed by id.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub is_archived: bool,
}

impl Bank {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            is_archived: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub number: Option<String>,
    pub bank_id: Uuid,
    pub currency: String,
    pub balance: f64,
    #[serde(default)]
    pub is_crypto: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_credit: bool,
}

impl Account {
    pub fn new(name: &str, bank_id: Uuid, currency: &str, balance: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            number: None,
            bank_id,
            currency: normalize_code(currency),
            balance,
            is_crypto: false,
            is_archived: false,
            is_credit: false,
        }
    }

    pub fn balance_item(&self) -> BalanceItem {
        BalanceItem::new(&self.currency, self.balance)
    }
}

/// Balances of the accounts that count towards totals.
pub fn balance_items(accounts: &[Account]) -> Vec<BalanceItem> {
    accounts
        .iter()
        .filter(|a| !a.is_archived)
        .map(Account::balance_item)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

impl Category {
    pub fn new(name: &str, icon: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            icon: icon.to_string(),
        }
    }
}

/// A single movement of money on an account.
///
/// Amount sign and currency are recorded as given by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    pub amount: f64,
    pub account_id: Uuid,
    pub bank_id: Uuid,
    pub currency: String,
    /// Rate used when the transaction currency differed from the account's.
    #[serde(default)]
    pub conversion_rate: Option<f64>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

impl Transaction {
    pub fn new(account: &Account, amount: f64, currency: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            amount,
            account_id: account.id,
            bank_id: account.bank_id,
            currency: normalize_code(currency),
            conversion_rate: None,
            date: Utc::now(),
            location: None,
            note: None,
            category_id: None,
        }
    }

    /// Records how many units of the account currency one unit of the
    /// transaction currency was worth. Left empty when the currencies match
    /// or `rates` cannot convert between them.
    pub fn fill_conversion_rate(&mut self, account: &Account, rates: &RateTable) {
        self.conversion_rate = if self.currency == account.currency {
            None
        } else {
            convert(1.0, &self.currency, &account.currency, rates).ok()
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub bank_id: Option<Uuid>,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub is_instalments: bool,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub payment: f64,
    #[serde(default)]
    pub payments: Vec<DateTime<Utc>>,
}

impl Loan {
    pub fn new(name: &str, amount: f64, currency: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            bank_id: None,
            amount,
            currency: normalize_code(currency),
            is_instalments: false,
            duration_days: None,
            payment: 0.0,
            payments: Vec::new(),
        }
    }

    pub fn amount_item(&self) -> BalanceItem {
        BalanceItem::new(&self.currency, self.amount)
    }

    pub fn payment_item(&self) -> BalanceItem {
        BalanceItem::new(&self.currency, self.payment)
    }
}

impl Entity for Bank {
    const COLLECTION: &'static str = "banks";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for Account {
    const COLLECTION: &'static str = "accounts";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for Category {
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for Transaction {
    const COLLECTION: &'static str = "transactions";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for Loan {
    const COLLECTION: &'static str = "loans";

    fn id(&self) -> Uuid {
        self.id
    }
}
