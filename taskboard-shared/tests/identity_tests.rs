/// Integration tests for the identity service
///
/// Run against the in-memory store, so no database is needed.

use std::sync::Arc;

use chrono::{Duration, Utc};
use taskboard_shared::auth::jwt::{self, Claims, TokenType};
use taskboard_shared::identity::{
    ChangePassword, IdentityError, IdentityService, IdentitySettings, SignIn, SignUp,
};
use taskboard_shared::models::user::UpdateProfile;
use taskboard_shared::store::{MemoryStore, Store};

const SECRET: &str = "identity-tests-secret-at-least-32-bytes";
const PASSWORD: &str = "Sup3r$ecret";

fn setup() -> (Arc<MemoryStore>, IdentityService) {
    let store = Arc::new(MemoryStore::new());
    let identity = IdentityService::new(store.clone(), IdentitySettings::new(SECRET));
    (store, identity)
}

fn jane() -> SignUp {
    SignUp {
        email: "Jane.Doe@Example.com".to_string(),
        password: PASSWORD.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        role: "Product Manager".to_string(),
        department: "Product".to_string(),
    }
}

#[tokio::test]
async fn test_sign_up_then_current_user() {
    let (_, identity) = setup();

    let signed_in = identity.sign_up(jane()).await.unwrap();
    assert_eq!(signed_in.user.email, "jane.doe@example.com");
    assert!(signed_in.expires_in > 0);

    let me = identity
        .current_user(&signed_in.access_token)
        .await
        .expect("token should authenticate");
    assert_eq!(me.id, signed_in.user.id);
    assert_eq!(me.full_name(), "Jane Doe");
}

#[tokio::test]
async fn test_sign_up_rejects_duplicate_email() {
    let (store, identity) = setup();
    identity.sign_up(jane()).await.unwrap();

    let mut again = jane();
    again.email = "JANE.DOE@example.com".to_string();

    let result = identity.sign_up(again).await;
    assert!(matches!(result, Err(IdentityError::EmailTaken)));
    assert_eq!(store.credential_count().await, 1);
}

#[tokio::test]
async fn test_sign_up_rejects_weak_password() {
    let (store, identity) = setup();

    let mut weak = jane();
    weak.password = "password".to_string();

    let result = identity.sign_up(weak).await;
    assert!(matches!(result, Err(IdentityError::WeakPassword(_))));
    assert_eq!(store.credential_count().await, 0);
}

#[tokio::test]
async fn test_failed_profile_insert_leaves_no_credential() {
    let (store, identity) = setup();
    store.fail_profile_inserts(true);

    let result = identity.sign_up(jane()).await;
    assert!(matches!(result, Err(IdentityError::ProfileCreation(_))));
    assert_eq!(store.credential_count().await, 0);

    // The email is free again once the store recovers
    store.fail_profile_inserts(false);
    assert!(identity.sign_up(jane()).await.is_ok());
}

#[tokio::test]
async fn test_sign_in() {
    let (_, identity) = setup();
    let signed_up = identity.sign_up(jane()).await.unwrap();

    let signed_in = identity
        .sign_in(SignIn {
            email: "jane.doe@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();

    assert_eq!(signed_in.user.id, signed_up.user.id);
    assert_ne!(signed_in.session_id, signed_up.session_id);
}

#[tokio::test]
async fn test_sign_in_wrong_password_or_unknown_email() {
    let (_, identity) = setup();
    identity.sign_up(jane()).await.unwrap();

    let wrong_password = identity
        .sign_in(SignIn {
            email: "jane.doe@example.com".to_string(),
            password: "Wr0ng$password".to_string(),
        })
        .await;
    assert!(matches!(wrong_password, Err(IdentityError::InvalidCredentials)));

    let unknown = identity
        .sign_in(SignIn {
            email: "nobody@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await;
    assert!(matches!(unknown, Err(IdentityError::InvalidCredentials)));
}

#[tokio::test]
async fn test_signed_out_session_no_longer_authenticates() {
    let (_, identity) = setup();
    let signed_in = identity.sign_up(jane()).await.unwrap();

    let caller = identity.authenticate(&signed_in.access_token).await.unwrap();
    identity.sign_out(&caller).await.unwrap();

    assert!(identity.current_user(&signed_in.access_token).await.is_none());
    assert!(matches!(
        identity.authenticate(&signed_in.access_token).await,
        Err(IdentityError::Unauthenticated(_))
    ));
    assert!(identity.refresh(&signed_in.refresh_token).await.is_err());

    // Signing out twice is harmless
    assert!(identity.sign_out(&caller).await.is_ok());
}

#[tokio::test]
async fn test_sign_out_leaves_other_sessions_alone() {
    let (_, identity) = setup();
    let first = identity.sign_up(jane()).await.unwrap();
    let second = identity
        .sign_in(SignIn {
            email: "jane.doe@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();

    let caller = identity.authenticate(&first.access_token).await.unwrap();
    identity.sign_out(&caller).await.unwrap();

    assert!(identity.current_user(&second.access_token).await.is_some());
}

#[tokio::test]
async fn test_refresh_issues_working_access_token() {
    let (_, identity) = setup();
    let signed_in = identity.sign_up(jane()).await.unwrap();

    let refreshed = identity.refresh(&signed_in.refresh_token).await.unwrap();
    let caller = identity.authenticate(&refreshed.access_token).await.unwrap();

    assert_eq!(caller.user_id, signed_in.user.id);
    assert_eq!(caller.session_id, signed_in.session_id);
}

#[tokio::test]
async fn test_tokens_are_not_interchangeable() {
    let (_, identity) = setup();
    let signed_in = identity.sign_up(jane()).await.unwrap();

    assert!(identity.authenticate(&signed_in.refresh_token).await.is_err());
    assert!(identity.refresh(&signed_in.access_token).await.is_err());
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let (store, identity) = setup();
    let signed_in = identity.sign_up(jane()).await.unwrap();

    let other = IdentityService::new(
        store,
        IdentitySettings::new("a-different-secret-also-32-bytes-long"),
    );
    assert!(other.current_user(&signed_in.access_token).await.is_none());
}

#[tokio::test]
async fn test_update_profile() {
    let (_, identity) = setup();
    let signed_in = identity.sign_up(jane()).await.unwrap();
    let caller = identity.authenticate(&signed_in.access_token).await.unwrap();

    let user = identity
        .update_profile(
            &caller,
            UpdateProfile {
                department: Some("Design".to_string()),
                location: Some(Some("Berlin".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(user.department, "Design");
    assert_eq!(user.location.as_deref(), Some("Berlin"));
    assert_eq!(user.first_name, "Jane");

    let unchanged = identity
        .update_profile(&caller, UpdateProfile::default())
        .await
        .unwrap();
    assert_eq!(unchanged, user);
}

#[tokio::test]
async fn test_change_password() {
    let (_, identity) = setup();
    let signed_in = identity.sign_up(jane()).await.unwrap();
    let caller = identity.authenticate(&signed_in.access_token).await.unwrap();

    let wrong = identity
        .change_password(
            &caller,
            ChangePassword {
                current_password: "N0t$thepassword".to_string(),
                new_password: "N3w$ecret!".to_string(),
            },
        )
        .await;
    assert!(matches!(wrong, Err(IdentityError::InvalidCredentials)));

    let weak = identity
        .change_password(
            &caller,
            ChangePassword {
                current_password: PASSWORD.to_string(),
                new_password: "short".to_string(),
            },
        )
        .await;
    assert!(matches!(weak, Err(IdentityError::WeakPassword(_))));

    identity
        .change_password(
            &caller,
            ChangePassword {
                current_password: PASSWORD.to_string(),
                new_password: "N3w$ecret!".to_string(),
            },
        )
        .await
        .unwrap();

    let sign_in = |password: &str| SignIn {
        email: "jane.doe@example.com".to_string(),
        password: password.to_string(),
    };
    assert!(identity.sign_in(sign_in(PASSWORD)).await.is_err());
    assert!(identity.sign_in(sign_in("N3w$ecret!")).await.is_ok());
}

#[tokio::test]
async fn test_email_is_trimmed_before_validation() {
    let (_, identity) = setup();

    let signed_up = identity
        .sign_up(SignUp {
            email: "  Jane.Doe@Example.com ".to_string(),
            ..jane()
        })
        .await
        .unwrap();
    assert_eq!(signed_up.user.email, "jane.doe@example.com");

    let signed_in = identity
        .sign_in(SignIn {
            email: " jane.doe@example.com\t".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(signed_in.user.id, signed_up.user.id);
}

#[tokio::test]
async fn test_oversized_session_ttl_fails_without_panicking() {
    let store = Arc::new(MemoryStore::new());
    let identity = IdentityService::new(
        store,
        IdentitySettings::new(SECRET).with_session_ttl(Duration::hours(3_000_000_000)),
    );

    let result = identity.sign_up(jane()).await;
    assert!(matches!(result, Err(IdentityError::SessionTtlOutOfRange)));
}

#[tokio::test]
async fn test_refresh_refused_when_session_nearly_expired() {
    let (store, identity) = setup();
    let signed_in = identity.sign_up(jane()).await.unwrap();

    let session = store
        .create_session(signed_in.user.id, Utc::now() + Duration::seconds(20))
        .await
        .unwrap();
    let refresh_token = jwt::create_token(
        &Claims::new(signed_in.user.id, session.id, TokenType::Refresh),
        SECRET,
    )
    .unwrap();

    let result = identity.refresh(&refresh_token).await;
    assert!(matches!(result, Err(IdentityError::Unauthenticated(_))));

    // A session with time left still refreshes
    assert!(identity.refresh(&signed_in.refresh_token).await.is_ok());
}
