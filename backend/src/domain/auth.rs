//! Authentication primitives: credentials, registrations, and token claims.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{
    BloodGroup, City, EmailAddress, Role, UserId, UserValidationError, non_blank,
};

/// Domain error returned when login or registration values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
    /// Display name was missing or blank once trimmed.
    EmptyName,
    /// A profile field failed validation.
    Field(UserValidationError),
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::Field(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(value: UserValidationError) -> Self {
        match value {
            UserValidationError::EmptyEmail => Self::EmptyEmail,
            other => Self::Field(other),
        }
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use lifelink::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" asha@example.com", "pw").unwrap();
/// assert_eq!(creds.email(), "asha@example.com");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    ///
    /// The email is not validated beyond being non-blank; a malformed email
    /// simply fails lookup and yields the generic credential error.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(CredentialsValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email string suitable for user lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raw registration fields as received from an inbound adapter.
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub blood_group: Option<String>,
    pub city: Option<String>,
    pub hospital_name: Option<String>,
    pub contact_number: Option<String>,
}

/// Validated password registration.
///
/// ## Invariants
/// - `role` is [`Role::Hospital`] only when the caller asked for `hospital`;
///   every other value registers a donor.
/// - `blood_group` is only kept for donors and `hospital_name` only for
///   hospitals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: EmailAddress,
    password: Zeroizing<String>,
    pub role: Role,
    pub blood_group: Option<BloodGroup>,
    pub city: Option<City>,
    pub hospital_name: Option<String>,
    pub contact_number: Option<String>,
}

impl Registration {
    /// Validate and normalise raw registration input.
    pub fn try_from_input(input: RegistrationInput) -> Result<Self, CredentialsValidationError> {
        let RegistrationInput {
            name,
            email,
            password,
            role,
            blood_group,
            city,
            hospital_name,
            contact_number,
        } = input;

        let name = non_blank(name).ok_or(CredentialsValidationError::EmptyName)?;
        let email = non_blank(email).ok_or(CredentialsValidationError::EmptyEmail)?;
        let email = EmailAddress::new(email)?;
        let password = password
            .filter(|value| !value.is_empty())
            .ok_or(CredentialsValidationError::EmptyPassword)?;

        let role = match role.as_deref() {
            Some("hospital") => Role::Hospital,
            _ => Role::Donor,
        };
        let blood_group = match (role, non_blank(blood_group)) {
            (Role::Donor, Some(raw)) => Some(BloodGroup::parse(&raw)?),
            _ => None,
        };
        let city = non_blank(city).map(City::new).transpose()?;
        let hospital_name = match role {
            Role::Hospital => non_blank(hospital_name),
            Role::Donor | Role::Admin => None,
        };

        Ok(Self {
            name,
            email,
            password: Zeroizing::new(password),
            role,
            blood_group,
            city,
            hospital_name,
            contact_number: non_blank(contact_number),
        })
    }

    /// Plaintext password awaiting hashing.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Claims carried by a bearer token.
///
/// Only `subject` is authoritative; the optional fields are hints for
/// clients and are never used for authorisation decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: UserId,
    pub role: Option<Role>,
    pub city: Option<City>,
    pub blood_group: Option<BloodGroup>,
}

impl TokenClaims {
    /// Claims containing only the subject.
    pub fn for_subject(subject: UserId) -> Self {
        Self {
            subject,
            role: None,
            city: None,
            blood_group: None,
        }
    }

    /// Claims mirroring a user's current profile.
    pub fn for_user(user: &super::User) -> Self {
        Self {
            subject: user.id,
            role: user.role,
            city: user.city.clone(),
            blood_group: user.blood_group,
        }
    }
}

/// Whether an identity-provider sign-in should log into an existing account
/// or create a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignInMode {
    #[default]
    Login,
    Signup,
}

impl SignInMode {
    /// Parse the `state`/`mode` query value; anything but `signup` logs in.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("signup") => Self::Signup,
            _ => Self::Login,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
        }
    }
}
