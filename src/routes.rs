use crate::{api::leave_request, config::Config};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Literal segments are registered ahead of /{id} so "create", "filter",
    // "report" and "request" never parse as an id.
    cfg.service(
        web::scope(&config.api_prefix).service(
            web::scope("/leave-requests")
                .service(web::resource("").route(web::get().to(leave_request::list_all)))
                .service(web::resource("/create").route(web::post().to(leave_request::create)))
                .service(web::resource("/filter").route(web::get().to(leave_request::filter)))
                .service(web::resource("/report").route(web::get().to(leave_request::report)))
                .service(web::resource("/request").route(web::post().to(leave_request::request)))
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(leave_request::get_one))
                        .route(web::put().to(leave_request::update))
                        .route(web::delete().to(leave_request::delete)),
                )
                .service(
                    web::resource("/{id}/approve").route(web::post().to(leave_request::approve)),
                ),
        ),
    );
}
