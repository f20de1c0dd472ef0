use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::service::{AuthService, AuthConfig};
use service::auth::repository::mock::MockAuthRepository;
use service::auth::domain::{RegisterInput, LoginInput};

fn bench_auth(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 1, password_algorithm: "argon2".into() });

    // register outside of the measured loop
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _ = rt.block_on(svc.register(RegisterInput {
        username: "bench".into(),
        email: Some("bench@licensing.com".into()),
        full_name: "Bench".into(),
        position: None,
        department: None,
        roles: vec!["MANAGER".into()],
        password: "Benchmark1".into(),
    }));

    c.bench_function("auth_login", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.login(LoginInput { username: "bench".into(), password: "Benchmark1".into() })).unwrap();
        });
    });

    let token = rt
        .block_on(svc.login(LoginInput { username: "bench".into(), password: "Benchmark1".into() }))
        .unwrap()
        .token;
    c.bench_function("auth_verify_token", |b| {
        b.iter(|| svc.verify_token(&token).unwrap());
    });
}

criterion_group!(benches, bench_auth);
criterion_main!(benches);
