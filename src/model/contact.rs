/// The `contactType` values allowed by the SAML metadata schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactType {
    Technical,
    Support,
    Administrative,
    Billing,
    Other,
}

impl ContactType {
    pub const ALL: [ContactType; 5] = [
        ContactType::Technical,
        ContactType::Support,
        ContactType::Administrative,
        ContactType::Billing,
        ContactType::Other,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ContactType::Technical => "technical",
            ContactType::Support => "support",
            ContactType::Administrative => "administrative",
            ContactType::Billing => "billing",
            ContactType::Other => "other",
        }
    }

    /// Exact, case-sensitive match against the enumeration.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl std::fmt::Display for ContactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `ContactPerson` entry published in SP metadata.
///
/// `contact_type` is kept as the raw configured string so that values outside
/// the enumeration can be reported instead of rejected at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub contact_type: String,
    pub company: String,
    pub given_name: String,
    pub sur_name: String,
    pub email_addresses: Vec<String>,
    pub telephone_numbers: Vec<String>,
}

impl Contact {
    pub fn new(contact_type: impl Into<String>) -> Self {
        Self {
            contact_type: contact_type.into(),
            ..Self::default()
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_name(mut self, given_name: impl Into<String>, sur_name: impl Into<String>) -> Self {
        self.given_name = given_name.into();
        self.sur_name = sur_name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email_addresses.push(email.into());
        self
    }

    pub fn with_telephone(mut self, number: impl Into<String>) -> Self {
        self.telephone_numbers.push(number.into());
        self
    }

    /// The parsed contact type, or `None` when the configured value is not
    /// part of the enumeration.
    pub fn kind(&self) -> Option<ContactType> {
        ContactType::parse(&self.contact_type)
    }
}

/// The `Organization` block published in SP metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Organization {
    pub name: String,
    pub display_name: String,
    pub url: String,
    /// `xml:lang` used when rendering metadata.
    pub lang: String,
}

impl Organization {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            url: url.into(),
            lang: "en".to_string(),
        }
    }
}
