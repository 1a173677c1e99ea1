pub mod account;
pub mod admin;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/account")
            .service(account::register)
            .service(account::login)
            .service(account::refresh),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::my_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/users")
            .service(users::update_profile)
            .service(users::delete_account),
    )
    .service(
        web::scope("/admin")
            .service(admin::all_tasks)
            .service(admin::all_users)
            .service(admin::delete_user),
    );
}
