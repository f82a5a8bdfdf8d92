
use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;

use blue_api::auth::password::hash_password;
use blue_api::entities::image::{ImageAction, ImageInput, ImageSource, Owner};
use blue_api::entities::user::{
    ChangePasswordRequest, RegisterRequest, SetUserImageRequest, User, UserInsert,
};
use blue_api::errors::AppError;
use blue_api::repositories::image::ImageRepository;
use blue_api::repositories::user::UserRepository;
use blue_api::use_cases::reconcile::AttachmentReconciler;
use blue_api::use_cases::users::UserHandler;

use test_utils::{InMemoryImageRepo, InMemoryOwnerRepo};

mock! {
    pub UserRepo {}

    #[async_trait]
    impl UserRepository for UserRepo {
        async fn create_user(&self, user: &UserInsert) -> Result<User, AppError>;
        async fn get_all_users(&self) -> Result<Vec<User>, AppError>;
        async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
        async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
        async fn update_user(
            &self,
            id: i64,
            name: &str,
            email: &str,
        ) -> Result<Option<User>, AppError>;
        async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool, AppError>;
        async fn delete_user(&self, id: i64) -> Result<bool, AppError>;
    }
}

fn sample_user(id: i64, password_hash: &str) -> User {
    User {
        id,
        name: "Ana".to_string(),
        email: "ana@example.com".to_string(),
        password_hash: password_hash.to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn handler(repo: MockUserRepo) -> UserHandler<MockUserRepo, InMemoryImageRepo> {
    UserHandler::new(repo, InMemoryImageRepo::new())
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let mut repo = MockUserRepo::new();
    repo.expect_get_user_by_email().returning(|email| {
        assert_eq!(email, "ana@example.com");
        Ok(Some(sample_user(1, "hash")))
    });

    let result = handler(repo)
        .register(RegisterRequest {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "Secret123".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn register_creates_user_with_hashed_password() {
    let mut repo = MockUserRepo::new();
    repo.expect_get_user_by_email().returning(|_| Ok(None));
    repo.expect_create_user().returning(|insert| {
        assert_ne!(insert.password_hash, "Secret123");
        assert!(insert.password_hash.starts_with("$argon2"));
        let mut user = sample_user(1, &insert.password_hash);
        user.name = insert.name.clone();
        user.email = insert.email.clone();
        Ok(user)
    });

    let response = handler(repo)
        .register(RegisterRequest {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "Secret123".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.email, "ana@example.com");
    assert!(response.image.is_empty());
}

#[tokio::test]
async fn register_rejects_invalid_email_before_touching_the_repo() {
    let repo = MockUserRepo::new();

    let result = handler(repo)
        .register(RegisterRequest {
            name: "Ana".to_string(),
            email: "not-an-email".to_string(),
            password: "Secret123".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn change_password_rejects_wrong_current_password() {
    let hash = hash_password("Right123").unwrap();
    let mut repo = MockUserRepo::new();
    repo.expect_get_user_by_id()
        .returning(move |id| Ok(Some(sample_user(id, &hash))));

    let result = handler(repo)
        .change_password(
            1,
            &ChangePasswordRequest {
                current_password: "Wrong123".to_string(),
                new_password: "NewSecret1".to_string(),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn change_password_stores_a_new_hash() {
    let hash = hash_password("Right123").unwrap();
    let mut repo = MockUserRepo::new();
    repo.expect_get_user_by_id()
        .returning(move |id| Ok(Some(sample_user(id, &hash))));
    repo.expect_update_password()
        .withf(|_, new_hash| new_hash.starts_with("$argon2"))
        .returning(|_, _| Ok(true));

    handler(repo)
        .change_password(
            1,
            &ChangePasswordRequest {
                current_password: "Right123".to_string(),
                new_password: "NewSecret1".to_string(),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_user_cascades_to_its_images_only() {
    let mut repo = MockUserRepo::new();
    repo.expect_get_user_by_id()
        .returning(|id| Ok(Some(sample_user(id, "hash"))));
    repo.expect_delete_user().returning(|_| Ok(true));

    let handler = handler(repo);

    seed_image(&handler.image_repo, Owner::user(1), "http://u/1.png").await;
    seed_image(&handler.image_repo, Owner::article(1), "http://a/1.png").await;

    handler.delete_user(1).await.unwrap();

    assert!(handler
        .image_repo
        .find_by_owner(&Owner::user(1))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        handler
            .image_repo
            .find_by_owner(&Owner::article(1))
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn set_user_image_keeps_a_single_row() {
    let mut repo = MockUserRepo::new();
    repo.expect_get_user_by_id()
        .returning(|id| Ok(Some(sample_user(id, "hash"))));

    let handler = handler(repo);

    handler
        .set_user_image(1, &SetUserImageRequest { url: "http://u/old.png".to_string() })
        .await
        .unwrap();
    let image = handler
        .set_user_image(1, &SetUserImageRequest { url: "http://u/new.png".to_string() })
        .await
        .unwrap();

    assert_eq!(image.url, "http://u/new.png");
    assert_eq!(image.source, ImageSource::Url);

    let rows = handler
        .image_repo
        .find_by_owner(&Owner::user(1))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].url, "http://u/new.png");
}

#[tokio::test]
async fn set_user_image_requires_an_existing_user() {
    let mut repo = MockUserRepo::new();
    repo.expect_get_user_by_id().returning(|_| Ok(None));

    let result = handler(repo)
        .set_user_image(9, &SetUserImageRequest { url: "http://u/x.png".to_string() })
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn user_reconcile_replace_mirrors_profile_image_semantics() {
    // The reconciler applied to a User owner gives the same single-image
    // outcome as the dedicated profile-image endpoint.
    let owner = Owner::user(5);
    let reconciler =
        AttachmentReconciler::new(InMemoryImageRepo::new(), InMemoryOwnerRepo::with_owner(owner));

    reconciler
        .reconcile(
            owner,
            ImageAction::Replace,
            &[ImageInput { url: "http://u/1.png".to_string(), source: ImageSource::Url }],
        )
        .await
        .unwrap();
    let after = reconciler
        .reconcile(
            owner,
            ImageAction::Replace,
            &[ImageInput { url: "http://u/2.png".to_string(), source: ImageSource::Url }],
        )
        .await
        .unwrap();

    assert_eq!(after.len(), 1);
    assert_eq!(after[0].url, "http://u/2.png");
}

async fn seed_image(repo: &InMemoryImageRepo, owner: Owner, url: &str) {
    use blue_api::entities::image::NewImage;
    repo.create_image(&NewImage {
        url: url.to_string(),
        source: ImageSource::Url,
        owner,
    })
    .await
    .unwrap();
}
