use crate::{
    application::{
        self,
        application_dto::{ApplicationRequest, PinApplicationRequest, UpdateApplicationStatusRequest},
        application_handlers,
        Application, ApplicationStatus,
    },
    middleware::auth_middleware,
    notification::{notification_handlers, Notification},
    reminder::{self, reminder_handlers, CreateReminderRequest, Reminder, UpdateReminderRequest},
    state::AppState,
};
use axum::{
    middleware,
    routing::{get, patch},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        application_handlers::get_applications,
        application_handlers::get_application,
        application_handlers::create_application,
        application_handlers::update_application,
        application_handlers::update_application_status,
        application_handlers::pin_application,
        application_handlers::delete_application,
        reminder_handlers::get_reminders,
        reminder_handlers::create_reminder,
        reminder_handlers::update_reminder,
        reminder_handlers::delete_reminder,
        notification_handlers::get_notifications,
        notification_handlers::notification_stream,
        notification_handlers::mark_notification_read,
    ),
    components(
        schemas(
            Application,
            ApplicationStatus,
            ApplicationRequest,
            UpdateApplicationStatusRequest,
            PinApplicationRequest,
            Reminder,
            CreateReminderRequest,
            UpdateReminderRequest,
            Notification,
        )
    ),
    tags(
        (name = "applications", description = "Job application board endpoints"),
        (name = "reminders", description = "Reminder endpoints"),
        (name = "notifications", description = "Notification endpoints")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let application_routes = Router::new()
        .route(
            "/",
            get(application::get_applications).post(application::create_application),
        )
        .route(
            "/:id",
            get(application::get_application)
                .put(application::update_application)
                .delete(application::delete_application),
        )
        .route("/:id/status", patch(application::update_application_status))
        .route("/:id/pin", patch(application::pin_application));

    let reminder_routes = Router::new()
        .route(
            "/",
            get(reminder::get_reminders).post(reminder::create_reminder),
        )
        .route(
            "/:id",
            axum::routing::put(reminder::update_reminder).delete(reminder::delete_reminder),
        );

    let notification_routes = Router::new()
        .route("/", get(notification_handlers::get_notifications))
        .route("/stream", get(notification_handlers::notification_stream))
        .route("/:id/read", patch(notification_handlers::mark_notification_read));

    // Every API route requires a session
    let api_routes = Router::new()
        .nest("/applications", application_routes)
        .nest("/reminders", reminder_routes)
        .nest("/notifications", notification_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
