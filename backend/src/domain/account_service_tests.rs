//! Tests for `AccountService` with mocked security collaborators.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::{AccountService, AccountServiceDeps};
use crate::domain::ports::{
    AccountCommand, AccountQuery, CaptchaError, CaptchaVerifier, ExternalIdentity,
    IdentityProviderError, MockCaptchaVerifier, MockIdentityProvider, MockPasswordHasher,
    MockTokenService, SocialSignInOutcome, SocialSignInRejection, UnconfiguredIdentityProvider,
    UserRepository,
};
use crate::domain::{
    BloodGroup, City, EmailAddress, ErrorCode, LoginCredentials, ProfileUpdate, Registration,
    RegistrationInput, Role, SignInMode, User, UserId,
};
use crate::outbound::memory::InMemoryUserRepository;

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

fn hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|password| Ok(format!("hashed:{password}")));
    hasher
        .expect_verify()
        .returning(|password, stored| Ok(stored == format!("hashed:{password}")));
    hasher
}

fn tokens() -> MockTokenService {
    let mut tokens = MockTokenService::new();
    tokens
        .expect_issue()
        .returning(|claims| Ok(format!("token-for-{}", claims.subject)));
    tokens
}

struct Builder {
    users: Arc<InMemoryUserRepository>,
    captcha: Option<MockCaptchaVerifier>,
    identity: Option<MockIdentityProvider>,
}

impl Builder {
    fn captcha(mut self, captcha: MockCaptchaVerifier) -> Self {
        self.captcha = Some(captcha);
        self
    }

    fn identity(mut self, identity: MockIdentityProvider) -> Self {
        self.identity = Some(identity);
        self
    }

    fn build(self) -> AccountService {
        AccountService::new(AccountServiceDeps {
            users: self.users,
            hasher: Arc::new(hasher()),
            tokens: Arc::new(tokens()),
            captcha: self
                .captcha
                .map(|c| Arc::new(c) as Arc<dyn CaptchaVerifier>),
            identity: match self.identity {
                Some(identity) => Arc::new(identity),
                None => Arc::new(UnconfiguredIdentityProvider),
            },
            clock: Arc::new(FixtureClock),
        })
    }
}

#[fixture]
fn users() -> Arc<InMemoryUserRepository> {
    Arc::new(InMemoryUserRepository::new())
}

fn builder(users: &Arc<InMemoryUserRepository>) -> Builder {
    Builder {
        users: Arc::clone(users),
        captcha: None,
        identity: None,
    }
}

fn registration(email: &str, role: Option<&str>) -> Registration {
    Registration::try_from_input(RegistrationInput {
        name: Some("Asha".to_owned()),
        email: Some(email.to_owned()),
        password: Some("s3cret".to_owned()),
        role: role.map(str::to_owned),
        blood_group: Some("b+".to_owned()),
        city: Some(" Pune ".to_owned()),
        hospital_name: Some("Ruby Hall".to_owned()),
        contact_number: None,
    })
    .expect("valid registration")
}

async fn stored_user(users: &InMemoryUserRepository, email: &str) -> User {
    users
        .find_by_email(email)
        .await
        .expect("lookup")
        .expect("user stored")
}

#[rstest]
#[tokio::test]
async fn register_stores_incomplete_donor(users: Arc<InMemoryUserRepository>) {
    let service = builder(&users).build();

    let id = service
        .register(registration("asha@example.com", None))
        .await
        .expect("register");

    let user = stored_user(&users, "asha@example.com").await;
    assert_eq!(user.id, id);
    assert_eq!(user.role, Some(Role::Donor));
    assert_eq!(user.blood_group, Some(BloodGroup::BPositive));
    assert_eq!(user.city, Some(City::new("pune").expect("city")));
    assert_eq!(user.hospital_name, None);
    assert_eq!(user.password_hash.as_deref(), Some("hashed:s3cret"));
    assert!(!user.profile_completed);
}

#[rstest]
#[tokio::test]
async fn register_hospital_drops_blood_group(users: Arc<InMemoryUserRepository>) {
    let service = builder(&users).build();

    service
        .register(registration("ruby@example.com", Some("hospital")))
        .await
        .expect("register");

    let user = stored_user(&users, "ruby@example.com").await;
    assert_eq!(user.role, Some(Role::Hospital));
    assert_eq!(user.blood_group, None);
    assert_eq!(user.hospital_name.as_deref(), Some("Ruby Hall"));
}

#[rstest]
#[tokio::test]
async fn duplicate_registration_is_rejected(users: Arc<InMemoryUserRepository>) {
    let service = builder(&users).build();
    service
        .register(registration("asha@example.com", None))
        .await
        .expect("first register");

    let err = service
        .register(registration("asha@example.com", None))
        .await
        .expect_err("duplicate rejected");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Email already registered");
}

#[rstest]
#[case("asha@example.com", "wrong")]
#[case("nobody@example.com", "s3cret")]
#[tokio::test]
async fn bad_credentials_share_one_error(
    users: Arc<InMemoryUserRepository>,
    #[case] email: &str,
    #[case] password: &str,
) {
    let service = builder(&users).build();
    service
        .register(registration("asha@example.com", None))
        .await
        .expect("register");

    let err = service
        .login(
            LoginCredentials::try_from_parts(email, password).expect("credentials"),
            None,
        )
        .await
        .expect_err("login rejected");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "Invalid email or password");
}

#[rstest]
#[tokio::test]
async fn passwordless_account_cannot_log_in(users: Arc<InMemoryUserRepository>) {
    let email = EmailAddress::new("social@example.com").expect("email");
    users
        .insert(&User::new("Social", email, FixtureClock.utc()))
        .await
        .expect("insert");
    let service = builder(&users).build();

    let err = service
        .login(
            LoginCredentials::try_from_parts("social@example.com", "anything")
                .expect("credentials"),
            None,
        )
        .await
        .expect_err("login rejected");

    assert_eq!(err.message(), "Invalid email or password");
}

#[rstest]
#[tokio::test]
async fn login_issues_token(users: Arc<InMemoryUserRepository>) {
    let service = builder(&users).build();
    let id = service
        .register(registration("asha@example.com", None))
        .await
        .expect("register");

    let session = service
        .login(
            LoginCredentials::try_from_parts("asha@example.com", "s3cret").expect("credentials"),
            None,
        )
        .await
        .expect("login");

    assert_eq!(session.token, format!("token-for-{id}"));
    assert_eq!(session.user.id, id);
}

#[rstest]
#[case(None, false)]
#[case(Some("bad"), false)]
#[case(Some("good"), true)]
#[tokio::test]
async fn captcha_gates_login_when_enabled(
    users: Arc<InMemoryUserRepository>,
    #[case] captcha_token: Option<&str>,
    #[case] accepted: bool,
) {
    let mut captcha = MockCaptchaVerifier::new();
    captcha
        .expect_verify()
        .returning(|token| Ok(token == "good"));
    let service = builder(&users).captcha(captcha).build();
    service
        .register(registration("asha@example.com", None))
        .await
        .expect("register");

    let result = service
        .login(
            LoginCredentials::try_from_parts("asha@example.com", "s3cret").expect("credentials"),
            captcha_token.map(str::to_owned),
        )
        .await;

    match result {
        Ok(_) => assert!(accepted),
        Err(err) => {
            assert!(!accepted);
            assert_eq!(err.code(), ErrorCode::InvalidRequest);
            assert_eq!(err.message(), "Captcha verification failed");
        }
    }
}

#[rstest]
#[tokio::test]
async fn captcha_transport_failure_rejects_login(users: Arc<InMemoryUserRepository>) {
    let mut captcha = MockCaptchaVerifier::new();
    captcha
        .expect_verify()
        .returning(|_| Err(CaptchaError::transport("timeout")));
    let service = builder(&users).captcha(captcha).build();

    let err = service
        .login(
            LoginCredentials::try_from_parts("asha@example.com", "s3cret").expect("credentials"),
            Some("token".to_owned()),
        )
        .await
        .expect_err("captcha failure");

    assert_eq!(err.message(), "Captcha verification failed");
}

#[rstest]
#[tokio::test]
async fn complete_profile_sets_role_and_flag(users: Arc<InMemoryUserRepository>) {
    let service = builder(&users).build();
    let id = service
        .register(registration("asha@example.com", None))
        .await
        .expect("register");

    let session = service
        .complete_profile(
            &id,
            ProfileUpdate {
                role: Role::Hospital,
                city: Some(City::new("Mumbai").expect("city")),
                state: Some("MH".to_owned()),
                pincode: Some("400001".to_owned()),
                address: None,
                blood_group: Some(BloodGroup::APositive),
                hospital_name: Some("Lilavati".to_owned()),
                contact_number: Some("022".to_owned()),
            },
        )
        .await
        .expect("complete profile");

    assert!(session.user.profile_completed);
    assert_eq!(session.user.role, Some(Role::Hospital));
    assert_eq!(session.user.blood_group, None);
    assert_eq!(session.user.hospital_name.as_deref(), Some("Lilavati"));
    let stored = stored_user(&users, "asha@example.com").await;
    assert_eq!(stored, session.user);
}

#[rstest]
#[tokio::test]
async fn complete_profile_keeps_registered_device_token(users: Arc<InMemoryUserRepository>) {
    let service = builder(&users).build();
    let id = service
        .register(registration("ravi@example.com", None))
        .await
        .expect("register");
    service
        .register_device_token(&id, "fcm-token".to_owned())
        .await
        .expect("device token");

    let session = service
        .complete_profile(
            &id,
            ProfileUpdate {
                role: Role::Donor,
                city: Some(City::new("Pune").expect("city")),
                state: None,
                pincode: None,
                address: None,
                blood_group: Some(BloodGroup::BPositive),
                hospital_name: None,
                contact_number: None,
            },
        )
        .await
        .expect("complete profile");

    assert_eq!(session.user.device_token.as_deref(), Some("fcm-token"));
    let stored = stored_user(&users, "ravi@example.com").await;
    assert_eq!(stored.device_token.as_deref(), Some("fcm-token"));
}

#[rstest]
#[tokio::test]
async fn complete_profile_for_unknown_user_is_not_found(users: Arc<InMemoryUserRepository>) {
    let service = builder(&users).build();

    let err = service
        .complete_profile(
            &UserId::random(),
            ProfileUpdate {
                role: Role::Donor,
                city: None,
                state: None,
                pincode: None,
                address: None,
                blood_group: None,
                hospital_name: None,
                contact_number: None,
            },
        )
        .await
        .expect_err("missing user");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn device_token_is_trimmed_and_required(users: Arc<InMemoryUserRepository>) {
    let service = builder(&users).build();
    let id = service
        .register(registration("asha@example.com", None))
        .await
        .expect("register");

    let err = service
        .register_device_token(&id, "   ".to_owned())
        .await
        .expect_err("blank token");
    assert_eq!(err.message(), "Missing device token");

    service
        .register_device_token(&id, " fcm-token ".to_owned())
        .await
        .expect("store token");
    let user = service.current_user(&id).await.expect("current user");
    assert_eq!(user.device_token.as_deref(), Some("fcm-token"));
}

#[rstest]
#[tokio::test]
async fn current_user_missing_is_not_found(users: Arc<InMemoryUserRepository>) {
    let err = builder(&users)
        .build()
        .current_user(&UserId::random())
        .await
        .expect_err("missing user");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "User not found");
}

fn identity_returning(email: Option<&str>) -> MockIdentityProvider {
    let email = email.map(str::to_owned);
    let mut identity = MockIdentityProvider::new();
    identity.expect_exchange_code().returning(move |_| {
        Ok(ExternalIdentity {
            email: email.clone(),
            name: None,
        })
    });
    identity
}

#[rstest]
#[tokio::test]
async fn social_signup_creates_passwordless_account(users: Arc<InMemoryUserRepository>) {
    let service = builder(&users)
        .identity(identity_returning(Some("new.donor@example.com")))
        .build();

    let outcome = service.social_sign_in("code", SignInMode::Signup).await;

    let user = stored_user(&users, "new.donor@example.com").await;
    assert_eq!(
        outcome,
        SocialSignInOutcome::SignedIn {
            token: format!("token-for-{}", user.id),
            mode: SignInMode::Signup,
        }
    );
    assert_eq!(user.name, "new.donor");
    assert_eq!(user.role, None);
    assert_eq!(user.password_hash, None);
    assert!(!user.profile_completed);
}

#[rstest]
#[case(SignInMode::Login, false, SocialSignInRejection::NoAccount)]
#[case(SignInMode::Signup, true, SocialSignInRejection::AlreadyExists)]
#[tokio::test]
async fn social_sign_in_mode_mismatches(
    users: Arc<InMemoryUserRepository>,
    #[case] mode: SignInMode,
    #[case] account_exists: bool,
    #[case] expected: SocialSignInRejection,
) {
    if account_exists {
        let email = EmailAddress::new("asha@example.com").expect("email");
        users
            .insert(&User::new("Asha", email, FixtureClock.utc()))
            .await
            .expect("insert");
    }
    let service = builder(&users)
        .identity(identity_returning(Some("asha@example.com")))
        .build();

    let outcome = service.social_sign_in("code", mode).await;

    assert_eq!(outcome, SocialSignInOutcome::Rejected(expected));
}

#[rstest]
#[tokio::test]
async fn social_sign_in_without_email_is_rejected(users: Arc<InMemoryUserRepository>) {
    let service = builder(&users).identity(identity_returning(None)).build();

    let outcome = service.social_sign_in("code", SignInMode::Login).await;

    assert_eq!(
        outcome,
        SocialSignInOutcome::Rejected(SocialSignInRejection::MissingEmail)
    );
}

#[rstest]
#[tokio::test]
async fn social_exchange_failure_is_provider_failure(users: Arc<InMemoryUserRepository>) {
    let mut identity = MockIdentityProvider::new();
    identity
        .expect_exchange_code()
        .returning(|_| Err(IdentityProviderError::exchange("invalid_grant")));
    let service = builder(&users).identity(identity).build();

    let outcome = service.social_sign_in("code", SignInMode::Login).await;

    assert_eq!(
        outcome,
        SocialSignInOutcome::Rejected(SocialSignInRejection::ProviderFailed)
    );
}

#[rstest]
#[tokio::test]
async fn sign_in_url_requires_configuration(users: Arc<InMemoryUserRepository>) {
    let err = builder(&users)
        .build()
        .social_sign_in_url(SignInMode::Signup)
        .expect_err("unconfigured provider");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);

    let mut identity = MockIdentityProvider::new();
    identity
        .expect_authorization_url()
        .withf(|state| state == "signup")
        .returning(|state| Ok(format!("https://idp.example/auth?state={state}")));
    let url = builder(&users)
        .identity(identity)
        .build()
        .social_sign_in_url(SignInMode::Signup)
        .expect("url");
    assert_eq!(url, "https://idp.example/auth?state=signup");
}
