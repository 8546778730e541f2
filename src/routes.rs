use crate::{
    api::{bonus, member, payroll, sale},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(handlers::protected)
            .service(
                web::scope("/members")
                    // /members
                    .service(
                        web::resource("")
                            .route(web::post().to(member::create_member))
                            .route(web::get().to(member::list_members)),
                    )
                    // /members/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(member::update_member))
                            .route(web::get().to(member::get_member))
                            .route(web::delete().to(member::delete_member)),
                    ),
            )
            .service(
                web::scope("/sales")
                    // /sales
                    .service(
                        web::resource("")
                            .route(web::get().to(sale::list_sales))
                            .route(web::post().to(sale::create_sale)),
                    )
                    // /sales/{id}/validate
                    .service(
                        web::resource("/{id}/validate").route(web::put().to(sale::validate_sale)),
                    )
                    // /sales/{id}/reject
                    .service(web::resource("/{id}/reject").route(web::put().to(sale::reject_sale))),
            )
            .service(
                web::scope("/payroll")
                    // /payroll
                    .service(web::resource("").route(web::get().to(payroll::payroll_table)))
                    // /payroll/settings/{member_id}
                    .service(
                        web::resource("/settings/{member_id}")
                            .route(web::put().to(payroll::update_payroll_settings)),
                    )
                    // /payroll/bonus
                    .service(web::resource("/bonus").route(web::post().to(bonus::create_bonus)))
                    // /payroll/bonus/{id}
                    .service(
                        web::resource("/bonus/{id}").route(web::delete().to(bonus::delete_bonus)),
                    ),
            ),
    );
}
