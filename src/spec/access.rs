use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection type column of a `pg_hba.conf` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Local,
    Host,
    Hostssl,
    Hostnossl,
    Hostgssenc,
    Hostnogssenc,
}

impl RuleType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RuleType::Local => "local",
            RuleType::Host => "host",
            RuleType::Hostssl => "hostssl",
            RuleType::Hostnossl => "hostnossl",
            RuleType::Hostgssenc => "hostgssenc",
            RuleType::Hostnogssenc => "hostnogssenc",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One access-control record.
///
/// Records are rendered verbatim, one per line, in list order. The server
/// picks the first record that matches a connection attempt, so the order of
/// a rule list is significant.
///
/// ```rust
/// use pg_provision::spec::{AccessRule, RuleType};
///
/// let rule = AccessRule::new(RuleType::Host, "all", "all", Some("10.0.2.2/24"), "trust");
/// assert_eq!(rule.to_string(), "host all all 10.0.2.2/24 trust");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub database: String,
    pub name: String,
    /// Absent for `local` records, which match Unix-socket connections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub method: String,
}

impl AccessRule {
    pub fn new(
        rule_type: RuleType,
        database: impl Into<String>,
        name: impl Into<String>,
        address: Option<&str>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            rule_type,
            database: database.into(),
            name: name.into(),
            address: address.map(str::to_string),
            method: method.into(),
        }
    }
}

impl fmt::Display for AccessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.rule_type, self.database, self.name)?;
        if let Some(address) = &self.address {
            write!(f, " {address}")?;
        }
        write!(f, " {}", self.method)
    }
}
