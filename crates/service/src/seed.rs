//! Reference and demo data loaded at startup.
//!
//! Every step checks what is already there, so running it on each boot is safe.

use chrono::{Duration, Months, NaiveDate};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::Serialize;
use tracing::{info, instrument};

use models::{dev_store, region, store};

use crate::auth::domain::RegisterInput;
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::auth::service::AuthService;
use crate::errors::ServiceError;
use crate::store_service::{self, StoreRequest};

pub const REGION_LICENSE_TYPE: &str = "Табачная продукция";

/// `(code, name, ГИИД)`
pub const REGIONS: &[(&str, &str, &str)] = &[
    ("01", "Республика Адыгея", "d8327a56-80de-4df2-815c-4f6ab1224c50"),
    ("02", "Республика Башкортостан", "6f2cbfd8-692a-4eea-9b16-067210bde3fc"),
    ("03", "Республика Бурятия", "a84ebed3-153d-4ba9-8532-8bdf879e1f5a"),
    ("04", "Республика Алтай", "5c48611f-5de6-4771-9695-7e36a4e7529d"),
    ("05", "Республика Дагестан", "0bb7fa19-736d-49cf-ad0e-9774c4dae09b"),
    ("06", "Республика Ингушетия", "b2d8cd20-cabc-4deb-afad-f3c4b4d55821"),
    ("07", "Кабардино-Балкарская республика", "1781f74e-be4a-4697-9c6b-493057c94818"),
    ("08", "Республика Калмыкия", "491cde9d-9d76-4591-ab46-ea93c079e686"),
    ("09", "Карачаево-Черкесская республика", "61b95807-388a-4cb1-9bee-889f7cf811c8"),
    ("10", "Республика Карелия", "248d8071-06e1-425e-a1cf-d1ff4c4a14a8"),
    ("11", "Республика Коми", "c20180d9-ad9c-46d1-9eff-d60bc424592a"),
    ("12", "Республика Марий Эл", "de2cbtdf-9662-44a4-a4a4-8ad237ae4a3e"),
    ("13", "Республика Мордовия", "37a0c60a-9240-48b5-a87f-0d8c86cdb6e1"),
    ("14", "Республика Саха (Якутия)", "c225d3db-1db6-4063-ace0-b3fe9ea3805f"),
    ("15", "Республика Северная Осетия — Алания", "de459e9c-2933-4923-83d1-9c64cfd7a817"),
    ("16", "Республика Татарстан", "0c089b04-099e-4e0e-955a-6bf1ce525f1a"),
    ("17", "Республика Тыва", "026bc56f-3731-48e9-8245-655331f596c0"),
    ("18", "Удмуртская республика", "52618b9c-bcbb-47e7-8957-95c63f0b17cc"),
    ("19", "Республика Хакасия", "8d3f1d35-f0f4-41b5-b5b7-e7cadf3e7bd7"),
    ("20", "Чеченская республика", "de67dc49-b9ba-48a3-a4cc-c2ebfeca6c5e"),
    ("21", "Чувашская республика", "878fc621-3708-46c7-a97f-5a13a4176b3e"),
    ("22", "Алтайский край", "8276c6a1-1a86-4f0d-8920-aba34d4cc34a"),
    ("23", "Краснодарский край", "d00e1013-16bd-4c09-b3d5-3cb09fc54bd8"),
    ("24", "Красноярский край", "db9c4f8b-b706-40e2-b2b4-d31b98dcd3d1"),
    ("25", "Приморский край", "43909681-d6e1-432d-b61f-ddac393cb5da"),
    ("26", "Ставропольский край", "327a060b-878c-4fb4-8dc4-d5595871a3d8"),
    ("27", "Хабаровский край", "7d468b39-1afa-41ec-8c4f-97a8603cb3d4"),
    ("28", "Амурская область", "844a80d6-5e31-4017-b422-4d9c01e9942c"),
    ("29", "Архангельская область", "294277aa-e25d-428c-95ad-46719c4ddb44"),
    ("30", "Астраханская область", "83009239-25cb-4561-af8e-7ee111b1cb73"),
    ("31", "Белгородская область", "639efe9d-3fc8-4438-8e70-ec4f2321f2a7"),
    ("32", "Брянская область", "f5807226-8be0-4ea8-91fc-39d053aec1e2"),
    ("33", "Владимирская область", "b8837188-39ee-4ff9-bc91-fcc9ed451bb3"),
    ("34", "Волгоградская область", "da051ec8-da2e-4a66-b542-473b8d221ab4"),
    ("35", "Вологодская область", "ed36085a-b2f5-454f-b9a9-1c9a678ee618"),
    ("36", "Воронежская область", "b756fe6b-bbd3-44d5-9302-5bfcc740f46e"),
    ("37", "Ивановская область", "0824434f-4098-4467-af72-d4f702fed335"),
    ("38", "Иркутская область", "6466c988-7ce3-45e5-8b97-90ae16cb1249"),
    ("39", "Калининградская область", "90c7181e-724f-41b3-b6c6-bd3ec7ae3f30"),
    ("40", "Калужская область", "18133adf-90c2-438e-88c4-62c41656de70"),
    ("41", "Кемеровская область", "393aeccb-89ef-4a7e-ae42-08d5cebc2e30"),
    ("42", "Кировская область", "0b940b96-103f-4248-850c-26b6c7296728"),
    ("43", "Костромская область", "15784a67-8cea-425b-834a-6afe0e3ed61c"),
    ("44", "Курганская область", "4a3d970f-520e-46b9-b16c-50d4ca7535a8"),
    ("45", "Курская область", "ee594d5e-30a9-40dc-b9f2-0add1be44ba1"),
    ("46", "Ленинградская область", "6d1ebb35-70c6-4129-bd55-da3969658f5d"),
    ("47", "Липецкая область", "1490490e-49c5-421c-9572-5673ba5d80c8"),
    ("48", "Магаданская область", "9c05e812-8679-4710-b8cb-5e8bd43cdf48"),
    ("49", "Московская область", "29251dcf-00a1-4e34-98d4-5c47484a36d4"),
    ("50", "Мурманская область", "1c727518-c96a-4f34-9ae6-fd510da3be03"),
    ("51", "Нижегородская область", "88cd27e2-6a8a-4421-9718-719a28a0a088"),
    ("52", "Новгородская область", "e5a84b81-8ea1-49e3-b3c4-0528651be129"),
    ("53", "Новосибирская область", "1ac46b49-3209-4814-b7bf-a509ea1aecd9"),
    ("54", "Омская область", "05426864-466d-41a3-82c4-11e61cdc98ce"),
    ("55", "Оренбургская область", "8bcec9d6-05bc-4e53-b45c-ba0c6f3a5c44"),
    ("56", "Орловская область", "5e465691-de23-4c4e-9f46-f35a125b5970"),
    ("57", "Пензенская область", "c99e7924-0428-4107-a302-4fd7c0cca3ff"),
    ("58", "Пермский край", "4f8b1a21-e4bb-422f-9087-d3cbf4bebc14"),
    ("59", "Псковская область", "f6e148a1-c9d0-4141-a608-93e3bd95e6c4"),
    ("60", "Ростовская область", "f10763dc-63e3-48db-83e1-9c566fe3092b"),
    ("61", "Рязанская область", "963073ee-4dfc-48bd-9a70-d2dfc6bd1f31"),
    ("62", "Самарская область", "3d7359-afa9-4aaa-8ff9-197e73906b1c"),
    ("63", "Саратовская область", "df594e0e-a935-4664-9d26-0bae13f904fe"),
    ("64", "Сахалинская область", "aea6280f-4648-460f-b8be-c2bc18923191"),
    ("65", "Свердловская область", "92b30014-4d52-4e2e-892d-928142b924bf"),
    ("66", "Смоленская область", "e8502180-6d08-431b-83ea-c7038f0df905"),
    ("67", "Тамбовская область", "a9a71961-9363-44ba-91b5-ddf0463aebc2"),
    ("68", "Тверская область", "61723327-1c20-42fe-8dfa-402638d9b396"),
    ("69", "Томская область", "889b1f3a-98aa-40fc-9d3d-0f41192758ab"),
    ("70", "Тульская область", "d028ec4f-f6da-4843-ada6-b68b3e0efa3d"),
    ("71", "Тюменская область", "54049357-326d-4b8f-b224-3c6dc25d6dd3"),
    ("72", "Ульяновская область", "fee76045-fe22-43a4-ad58-ad99e903bd58"),
    ("73", "Челябинская область", "27eb7c10-a234-44da-a59c-8b1f864966de"),
    ("74", "Забайкальский край", "b6ba5716-eb48-401b-8443-b197c9578734"),
    ("75", "Ярославская область", "a84b2ef4-db03-474b-b552-6229e801ae9b"),
    ("76", "Москва", "0c5b2444-70a0-4932-980c-b4dc0d3f02b5"),
    ("77", "Санкт-Петербург", "c2deb16a-0330-4f05-821f-1d09c93331e6"),
    ("78", "Еврейская автономная область", "1b507b09-48c9-434f-bf6f-65066211c73e"),
    ("79", "Ханты-Мансийский автономный округ - Югра", "d66e5325-3a25-4d29-ba86-4ca351d9704b"),
    ("80", "Ямало-Ненецкий автономный округ", "826fa834-3ee8-404f-bdbc-13a5221cfb6e"),
];

pub struct SeedUser {
    pub username: &'static str,
    pub password: &'static str,
    pub email: &'static str,
    pub full_name: &'static str,
    pub position: &'static str,
    pub department: &'static str,
    pub roles: &'static [&'static str],
}

pub const USERS: &[SeedUser] = &[
    SeedUser {
        username: "admin",
        password: "admin123",
        email: "admin@licensing.com",
        full_name: "Администратор Системы",
        position: "Системный администратор",
        department: "ИТ отдел",
        roles: &["ADMIN", "MANAGER"],
    },
    SeedUser {
        username: "manager",
        password: "manager123",
        email: "manager@licensing.com",
        full_name: "Иванов Иван Иванович",
        position: "Руководитель отдела лицензирования",
        department: "Отдел лицензирования",
        roles: &["MANAGER"],
    },
    SeedUser {
        username: "user2",
        password: "user2123",
        email: "user2@licensing.com",
        full_name: "Петров Петр Петрович",
        position: "Менеджер отдела лицензирования",
        department: "Отдел лицензирования",
        roles: &["MANAGER"],
    },
];

const STORE_NAMES: [&str; 55] = [
    "Продукты 24", "Магнит", "Пятёрочка", "Перекрёсток", "Дикси",
    "Алкомаркет", "Табачная лавка", "Винотека", "Сигары и табак", "Алко-Сити",
    "Продмаг №1", "Универсам", "Гастроном", "Супермаркет Центральный", "Народный",
    "Красное & Белое", "Бристоль", "Виктория", "Монетка", "Копейка",
    "Семья", "Лента", "О'Кей", "Ашан", "Метро",
    "Верный", "Авоська", "Пятачок", "Карусель", "Глобус",
    "Магнолия", "Рублёвский", "Азбука Вкуса", "Фреш Маркет", "Вкусвилл",
    "Бахетле", "Спар", "Атак", "Командор", "Виват",
    "Слата", "Магнум", "Квартал", "Соседи", "Наш Магазин",
    "Добрый", "Светофор", "Мария-Ра", "Гроздь", "Купец",
    "Алые Паруса", "Золотая Нива", "Радуга", "Изобилие", "Урожай",
];
const DISTRICTS: [&str; 10] = [
    "Центральный", "Северный", "Южный", "Восточный", "Западный",
    "Тверской", "Пресненский", "Арбат", "Хамовники", "Замоскворечье",
];
const STREETS: [&str; 15] = [
    "Ленина", "Пушкина", "Гоголя", "Чехова", "Тургенева",
    "Тверская", "Арбат", "Невский проспект", "Садовая", "Кутузовский проспект",
    "Ленинградский проспект", "Мира", "Вернадского", "Ломоносова", "Менделеева",
];
const FIRST_NAMES: [&str; 8] = ["Иван", "Петр", "Сергей", "Алексей", "Дмитрий", "Андрей", "Михаил", "Владимир"];
const LAST_NAMES: [&str; 8] = ["Иванов", "Петров", "Сидоров", "Смирнов", "Кузнецов", "Попов", "Васильев", "Соколов"];
const OKTMO: [&str; 4] = ["45339000", "45780000", "45398000", "45111000"];
const MUN_AREAS: [&str; 4] = ["Москва", "Санкт-Петербург", "Московская область", "Ленинградская область"];
const MUN_DISTRICTS: [&str; 5] = ["Москва", "Центральный", "Невский", "Подольск", "Красногорск"];
const BE: [&str; 4] = ["ООО «Агроторг»", "ООО «Перекресток»", "ООО «Дикси Юг»", "ООО «Магнит»"];

const DEV_CITIES: [(&str, &str); 10] = [
    ("Москва", "Московская область"),
    ("Санкт-Петербург", "Ленинградская область"),
    ("Казань", "Татарстан"),
    ("Нижний Новгород", "Нижегородская область"),
    ("Екатеринбург", "Свердловская область"),
    ("Новосибирск", "Новосибирская область"),
    ("Омск", "Омская область"),
    ("Челябинск", "Челябинская область"),
    ("Самара", "Самарская область"),
    ("Воронеж", "Воронежская область"),
];
const DEV_STATUSES: [&str; 3] = ["Active", "Planning", "Renovation"];
const DEV_STORE_COUNT: usize = 20;

/// Seed only when fewer stores than this exist.
pub const MIN_STORES: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub users: usize,
    pub regions: usize,
    pub stores: usize,
    pub dev_stores: usize,
}

fn phone(n: i64) -> String {
    format!("+7 (495) {:03}-{:02}-{:02}", n / 10000, (n / 100) % 100, n % 100)
}

fn months(d: NaiveDate, m: i32) -> Option<NaiveDate> {
    if m >= 0 {
        d.checked_add_months(Months::new(m as u32))
    } else {
        d.checked_sub_months(Months::new(m.unsigned_abs()))
    }
}

/// Latin and Cyrillic lower-case letters and digits of the name.
fn email_local_part(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || ('а'..='я').contains(c))
        .collect()
}

/// The `i`-th demo store. License expiries cycle through six patterns:
/// both valid, alcohol expired, tobacco expired, both expiring within a month,
/// alcohol only, tobacco only.
pub fn sample_store(i: usize, today: NaiveDate) -> StoreRequest {
    let name = STORE_NAMES[i % STORE_NAMES.len()];
    let n = i as i64;
    let m = (i % 12) as i32;
    let (alcohol, tobacco) = match i % 6 {
        0 => (months(today, 6 + m), months(today, 8 + (i % 10) as i32)),
        1 => (months(today, -(1 + (i % 6) as i32)), months(today, 3 + (i % 9) as i32)),
        2 => (months(today, 4 + (i % 8) as i32), months(today, -(2 + (i % 5) as i32))),
        3 => (Some(today + Duration::days(5 + n % 25)), Some(today + Duration::days(10 + n % 20))),
        4 => (months(today, 2 + (i % 10) as i32), None),
        _ => (None, months(today, 3 + (i % 8) as i32)),
    };
    StoreRequest {
        mvz: Some(format!("13CT{:04}", 1000 + i)),
        name: name.to_string(),
        address: format!(
            "г. Москва, {} р-н, ул. {}, д. {}",
            DISTRICTS[i % DISTRICTS.len()],
            STREETS[i % STREETS.len()],
            1 + (n * 7) % 150
        ),
        cfo: Some("E1028750".into()),
        oktmo: Some(OKTMO[i % OKTMO.len()].into()),
        has_restriction: i % 5 == 0,
        mun_area: Some(MUN_AREAS[i % MUN_AREAS.len()].into()),
        mun_district: Some(MUN_DISTRICTS[i % MUN_DISTRICTS.len()].into()),
        be: Some(BE[i % BE.len()].into()),
        close_date: if i % 10 == 9 { months(today, 1 + (i % 6) as i32) } else { None },
        director_phone: Some(phone(1_000_000 + (n * 123_456) % 9_000_000)),
        inn: format!("77{:010}", 1_234_567_890 + n),
        kpp: Some(format!("77{:02}01001", (i % 50) + 1)),
        contact_person: Some(format!("{} {} Иванович", LAST_NAMES[i % LAST_NAMES.len()], FIRST_NAMES[i % FIRST_NAMES.len()])),
        phone: Some(phone(2_000_000 + (n * 234_567) % 8_000_000)),
        email: Some(format!("{}@example.com", email_local_part(name))),
        alcohol_license_expiry: alcohol,
        tobacco_license_expiry: tobacco,
        is_active: Some(true),
    }
}

/// The `i`-th development-portal store.
pub fn sample_dev_store(i: usize, today: NaiveDate) -> dev_store::ActiveModel {
    let (city, region) = DEV_CITIES[i % DEV_CITIES.len()];
    let street = STREETS[i % STREETS.len()];
    let total = 250.0 + ((i * 97) % 1250) as f64;
    let trade = (total * (0.6 + (i % 6) as f64 * 0.05) * 100.0).round() / 100.0;
    dev_store::ActiveModel {
        code: Set(format!("СТ-{}", 1000 + i)),
        name: Set(format!("Чижик {street}")),
        address: Set(Some(format!("г. {city}, ул. {street}, д. {}", 1 + (i * 11) % 120))),
        city: Set(Some(city.to_string())),
        region: Set(Some(region.to_string())),
        total_area: Set(Some(total)),
        trade_area: Set(Some(trade)),
        status: Set(DEV_STATUSES[i % DEV_STATUSES.len()].to_string()),
        opening_date: Set(months(today, -(((i * 5) % 60) as i32))),
        ..Default::default()
    }
}

/// Default accounts; existing usernames are left alone.
#[instrument(skip_all)]
pub async fn seed_users<R: AuthRepository>(auth: &AuthService<R>, repo: &R) -> Result<usize, ServiceError> {
    let mut created = 0;
    for u in USERS {
        let exists = repo.find_user_by_username(u.username).await.map_err(auth_err)?.is_some();
        if exists {
            continue;
        }
        auth.register(RegisterInput {
            username: u.username.into(),
            email: Some(u.email.into()),
            full_name: u.full_name.into(),
            position: Some(u.position.into()),
            department: Some(u.department.into()),
            roles: u.roles.iter().map(|r| r.to_string()).collect(),
            password: u.password.into(),
        })
        .await
        .map_err(auth_err)?;
        info!(username = u.username, "seed_user_created");
        created += 1;
    }
    Ok(created)
}

pub async fn seed_regions(db: &DatabaseConnection) -> Result<usize, ServiceError> {
    if region::Entity::find().count(db).await? > 0 {
        return Ok(0);
    }
    for (code, name, giid) in REGIONS {
        region::create(db, region::ActiveModel {
            license_type: Set(Some(REGION_LICENSE_TYPE.into())),
            name: Set(name.to_string()),
            region_code: Set(Some(code.to_string())),
            region_giid: Set(Some(giid.to_string())),
            ..Default::default()
        })
        .await?;
    }
    info!(count = REGIONS.len(), "seed_regions_created");
    Ok(REGIONS.len())
}

pub async fn seed_stores(db: &DatabaseConnection, today: NaiveDate) -> Result<usize, ServiceError> {
    if store::Entity::find().count(db).await? >= MIN_STORES {
        return Ok(0);
    }
    let mut created = 0;
    for i in 0..STORE_NAMES.len() {
        let req = sample_store(i, today);
        let taken = store::Entity::find().filter(store::Column::Inn.eq(req.inn.clone())).count(db).await? > 0;
        if taken {
            continue;
        }
        store_service::create_store(db, req).await?;
        created += 1;
    }
    info!(count = created, "seed_stores_created");
    Ok(created)
}

pub async fn seed_dev_stores(db: &DatabaseConnection, today: NaiveDate) -> Result<usize, ServiceError> {
    if dev_store::Entity::find().count(db).await? > 0 {
        return Ok(0);
    }
    for i in 0..DEV_STORE_COUNT {
        dev_store::create(db, sample_dev_store(i, today)).await?;
    }
    info!(count = DEV_STORE_COUNT, "seed_dev_stores_created");
    Ok(DEV_STORE_COUNT)
}

/// Run every seeding step.
pub async fn run<R: AuthRepository>(
    db: &DatabaseConnection,
    auth: &AuthService<R>,
    repo: &R,
    today: NaiveDate,
) -> Result<SeedReport, ServiceError> {
    let report = SeedReport {
        users: seed_users(auth, repo).await?,
        regions: seed_regions(db).await?,
        stores: seed_stores(db, today).await?,
        dev_stores: seed_dev_stores(db, today).await?,
    };
    info!(?report, "seed_done");
    Ok(report)
}

fn auth_err(e: AuthError) -> ServiceError {
    match e {
        AuthError::Validation(m) => ServiceError::Validation(m),
        AuthError::Conflict => ServiceError::Conflict("user already exists".into()),
        other => ServiceError::Db(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use crate::auth::service::AuthConfig;
    use std::sync::Arc;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn region_table_is_complete() {
        assert_eq!(REGIONS.len(), 80);
        assert_eq!(REGIONS[0], ("01", "Республика Адыгея", "d8327a56-80de-4df2-815c-4f6ab1224c50"));
        let mut codes: Vec<&str> = REGIONS.iter().map(|r| r.0).collect();
        codes.dedup();
        assert_eq!(codes.len(), 80);
    }

    #[test]
    fn sample_store_fields() {
        let today = d("2024-01-31");
        let s = sample_store(0, today);
        assert_eq!(s.name, "Продукты 24");
        assert_eq!(s.inn, "771234567890");
        assert_eq!(s.kpp.as_deref(), Some("770101001"));
        assert_eq!(s.mvz.as_deref(), Some("13CT1000"));
        assert_eq!(s.address, "г. Москва, Центральный р-н, ул. Ленина, д. 1");
        assert_eq!(s.director_phone.as_deref(), Some("+7 (495) 100-00-00"));
        assert_eq!(s.email.as_deref(), Some("продукты24@example.com"));
        assert!(s.has_restriction);
        assert_eq!(s.alcohol_license_expiry, Some(d("2024-07-31")));
        assert!(models::store::validate_inn(&s.inn).is_ok());

        let expired = sample_store(1, today);
        assert!(expired.alcohol_license_expiry.unwrap() < today);
        assert!(sample_store(4, today).tobacco_license_expiry.is_none());
        assert!(sample_store(5, today).alcohol_license_expiry.is_none());
        assert!(sample_store(9, today).close_date.is_some());
    }

    #[test]
    fn sample_store_inns_are_unique() {
        let today = d("2024-01-01");
        let mut inns: Vec<String> = (0..STORE_NAMES.len()).map(|i| sample_store(i, today).inn).collect();
        inns.sort();
        inns.dedup();
        assert_eq!(inns.len(), STORE_NAMES.len());
    }

    #[test]
    fn sample_dev_store_areas_are_valid() {
        let today = d("2024-01-01");
        for i in 0..DEV_STORE_COUNT {
            let s = sample_dev_store(i, today);
            let total = s.total_area.clone().unwrap();
            let trade = s.trade_area.clone().unwrap();
            assert!(dev_store::validate_areas(total, trade).is_ok());
        }
    }

    #[tokio::test]
    async fn users_seeded_once() {
        let repo = Arc::new(MockAuthRepository::default());
        let auth = AuthService::new(repo.clone(), AuthConfig { jwt_secret: "s".into(), token_ttl_hours: 1, password_algorithm: "argon2".into() });
        assert_eq!(seed_users(&auth, repo.as_ref()).await.unwrap(), 3);
        assert_eq!(seed_users(&auth, repo.as_ref()).await.unwrap(), 0);
        let admin = repo.find_user_by_username("admin").await.unwrap().unwrap();
        assert!(admin.is_admin());
    }
}
