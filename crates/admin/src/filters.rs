//! Client-side search over already-fetched lists.

use std::fmt;
use std::str::FromStr;

use asrama_token_core::{Purchase, PurchaseStatus, User};

/// Residents matching `term`: case-insensitive on name and email, exact
/// substring on NIM. An empty term matches everyone.
#[must_use]
pub fn search_users<'a>(users: &'a [User], term: &str) -> Vec<&'a User> {
    let needle = term.to_lowercase();
    users
        .iter()
        .filter(|user| {
            user.name.to_lowercase().contains(&needle)
                || user.email.to_lowercase().contains(&needle)
                || user.nim.contains(term)
        })
        .collect()
}

/// Purchase status filter; `all` disables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(PurchaseStatus),
}

impl StatusFilter {
    #[must_use]
    pub fn matches(&self, status: PurchaseStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => write!(f, "{status}"),
        }
    }
}

/// Purchases matching `term` and `status`: case-insensitive on the
/// resident's name, exact substring on the token code.
#[must_use]
pub fn search_purchases<'a>(
    purchases: &'a [Purchase],
    term: &str,
    status: StatusFilter,
) -> Vec<&'a Purchase> {
    let needle = term.to_lowercase();
    purchases
        .iter()
        .filter(|purchase| {
            (purchase.user_name.to_lowercase().contains(&needle)
                || purchase.token_code.contains(term))
                && status.matches(purchase.status)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn users() -> Vec<User> {
        serde_json::from_value(json!([
            {
                "id": "u1", "name": "Budi Santoso", "email": "budi@student.unair.ac.id",
                "nim": "081911633001", "asrama": "Asrama Putra", "room": "A-101",
                "balance": 50000, "createdAt": "2024-01-01T00:00:00Z",
                "status": "active", "totalPurchases": 4
            },
            {
                "id": "u2", "name": "Siti Aminah", "email": "SITI@student.unair.ac.id",
                "nim": "081911633002", "asrama": "Asrama Putri", "room": "B-202",
                "balance": 0, "createdAt": "2024-01-02T00:00:00Z",
                "status": "inactive", "totalPurchases": 0
            }
        ]))
        .unwrap()
    }

    fn purchases() -> Vec<Purchase> {
        serde_json::from_value(json!([
            {
                "id": "p1", "userId": "u1", "userName": "Budi Santoso", "amount": 50000,
                "kwh": 33.5, "date": "2024-03-01T10:00:00Z", "status": "completed",
                "tokenCode": "1234-5678-9012-3456-7890"
            },
            {
                "id": "p2", "userId": "u2", "userName": "Siti Aminah", "amount": 20000,
                "kwh": 13.4, "date": "2024-03-02T10:00:00Z", "status": "pending",
                "tokenCode": "9999-0000-1111-2222-3333"
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_user_search_fields() {
        let users = users();
        assert_eq!(search_users(&users, "budi").len(), 1);
        assert_eq!(search_users(&users, "siti@").len(), 1);
        assert_eq!(search_users(&users, "633002")[0].name, "Siti Aminah");
        assert_eq!(search_users(&users, "").len(), 2);
        assert!(search_users(&users, "nobody").is_empty());
    }

    #[test]
    fn test_purchase_search_with_status() {
        let purchases = purchases();
        assert_eq!(search_purchases(&purchases, "", StatusFilter::All).len(), 2);
        assert_eq!(
            search_purchases(&purchases, "", StatusFilter::Only(PurchaseStatus::Pending))[0].user_name,
            "Siti Aminah"
        );
        assert_eq!(search_purchases(&purchases, "9012", StatusFilter::All).len(), 1);
        assert!(
            search_purchases(&purchases, "budi", StatusFilter::Only(PurchaseStatus::Failed))
                .is_empty()
        );
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("ALL".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "completed".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(PurchaseStatus::Completed)
        );
        assert!("refunded".parse::<StatusFilter>().is_err());
        assert_eq!(StatusFilter::All.to_string(), "all");
    }
}
