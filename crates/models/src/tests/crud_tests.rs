use crate::errors::ModelError;
use crate::{dev_store, egrn_extract, payment, payment_store, project, project_task, region, store, task, user, user_credentials};
use anyhow::Result;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

fn unique_inn() -> String {
    let n = Uuid::new_v4().as_u128() % 10_000_000_000;
    format!("{n:010}")
}

fn sample_store(inn: &str) -> store::ActiveModel {
    store::ActiveModel {
        name: Set("Магазин тест".into()),
        address: Set("г. Москва, ул. Тестовая, 1".into()),
        inn: Set(inn.to_string()),
        has_restriction: Set(false),
        is_active: Set(true),
        alcohol_license_expiry: Set(Some((Utc::now() + Duration::days(30)).date_naive())),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_user_and_credentials() -> Result<()> {
    let Some(db) = super::setup_test_db().await else { return Ok(()) };

    let username = format!("u{}", &Uuid::new_v4().simple().to_string()[..12]);
    let u = user::create(&db, &username, Some("tester@example.com"), "Test User", &["manager"]).await?;
    assert_eq!(u.roles, "MANAGER");
    assert!(u.has_role("manager"));

    let dup = user::create(&db, &username, None, "Other", &[]).await;
    assert!(matches!(dup, Err(ModelError::Conflict(_))));

    user_credentials::upsert_password(&db, u.id, "hash-1".into(), "argon2").await?;
    let c = user_credentials::upsert_password(&db, u.id, "hash-2".into(), "argon2").await?;
    assert_eq!(c.password_hash, "hash-2");

    user::Entity::delete_by_id(u.id).exec(&db).await?;
    assert!(user_credentials::find_by_user(&db, u.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_store_inn_unique() -> Result<()> {
    let Some(db) = super::setup_test_db().await else { return Ok(()) };

    let inn = unique_inn();
    let s = store::create(&db, sample_store(&inn)).await?;
    assert!(s.is_active);

    let dup = store::create(&db, sample_store(&inn)).await;
    assert!(matches!(dup, Err(ModelError::Conflict(_))));

    let bad = store::create(&db, sample_store("123")).await;
    assert!(matches!(bad, Err(ModelError::Validation(_))));

    store::Entity::delete_by_id(s.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_task_defaults_and_subtask_cascade() -> Result<()> {
    let Some(db) = super::setup_test_db().await else { return Ok(()) };

    let parent = task::create(&db, task::ActiveModel {
        title: Set("Получение лицензии".into()),
        license_type: Set(task::LicenseType::Alcohol),
        action_type: Set(task::ActionType::New),
        ..Default::default()
    })
    .await?;
    assert_eq!(parent.status, task::TaskStatus::Assigned);
    assert!(parent.updated_at.is_none());

    let child = task::create(&db, task::ActiveModel {
        title: Set("Оплата госпошлины".into()),
        license_type: Set(parent.license_type),
        action_type: Set(parent.action_type),
        parent_task_id: Set(Some(parent.id)),
        subtask_type: Set(Some(task::SubtaskType::StateFeePayment)),
        ..Default::default()
    })
    .await?;
    assert_eq!(child.parent_task_id, Some(parent.id));

    let missing_type = task::create(&db, task::ActiveModel { title: Set("x".into()), ..Default::default() }).await;
    assert!(matches!(missing_type, Err(ModelError::Validation(_))));

    task::Entity::delete_by_id(parent.id).exec(&db).await?;
    assert!(task::Entity::find_by_id(child.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_payment_with_stores() -> Result<()> {
    let Some(db) = super::setup_test_db().await else { return Ok(()) };

    let s1 = store::create(&db, sample_store(&unique_inn())).await?;
    let s2 = store::create(&db, sample_store(&unique_inn())).await?;
    let p = payment::create(
        &db,
        payment::ActiveModel {
            amount: Set(Decimal::new(350000, 2)),
            payment_type: Set(Some(payment::PaymentType::StateFee)),
            ..Default::default()
        },
        &[s1.id, s2.id, s1.id],
    )
    .await?;
    assert_eq!(p.status, payment::PaymentStatus::Pending);
    let mut ids = payment_store::store_ids(&db, p.id).await?;
    ids.sort_unstable();
    assert_eq!(ids, vec![s1.id.min(s2.id), s1.id.max(s2.id)]);

    payment::Entity::delete_by_id(p.id).exec(&db).await?;
    store::Entity::delete_by_id(s1.id).exec(&db).await?;
    store::Entity::delete_by_id(s2.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_region_and_egrn() -> Result<()> {
    let Some(db) = super::setup_test_db().await else { return Ok(()) };

    let r = region::create(&db, region::ActiveModel {
        name: Set("Тестовая область".into()),
        region_code: Set(Some("99".into())),
        ..Default::default()
    })
    .await?;
    let mut am: region::ActiveModel = r.clone().into();
    am.kpp = Set(Some("770101001".into()));
    am.updated_at = Set(Some(Utc::now().into()));
    let updated = am.update(&db).await?;
    assert_eq!(updated.kpp.as_deref(), Some("770101001"));
    region::Entity::delete_by_id(r.id).exec(&db).await?;

    let e = egrn_extract::create(&db, egrn_extract::ActiveModel {
        cadastral_number: Set("77:01:0001001:1234".into()),
        status: Set(egrn_extract::EgrnStatus::Draft),
        ..Default::default()
    })
    .await?;
    assert_eq!(e.status, egrn_extract::EgrnStatus::Submitted);
    egrn_extract::Entity::delete_by_id(e.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_dev_portal_defaults() -> Result<()> {
    let Some(db) = super::setup_test_db().await else { return Ok(()) };

    let s = dev_store::create(&db, dev_store::ActiveModel {
        code: Set(format!("DEV-{}", Uuid::new_v4().simple())),
        name: Set("Пятёрочка Тест".into()),
        ..Default::default()
    })
    .await?;
    assert_eq!(s.status, "Active");

    let p = project::create(&db, project::ActiveModel {
        store_id: Set(s.id),
        project_type: Set("Открытие".into()),
        ..Default::default()
    })
    .await?;
    assert_eq!(p.status, project::DEFAULT_STATUS);

    let t = project_task::create(&db, project_task::ActiveModel {
        project_id: Set(p.id),
        name: Set("Планирование аудита".into()),
        task_type: Set("Планирование аудита".into()),
        responsible: Set("НОР".into()),
        normative_deadline: Set(Utc::now().date_naive()),
        ..Default::default()
    })
    .await?;
    assert_eq!(t.status, project_task::DEFAULT_STATUS);

    dev_store::Entity::delete_by_id(s.id).exec(&db).await?;
    assert!(project::Entity::find_by_id(p.id).one(&db).await?.is_none());
    Ok(())
}
