use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        analytics::{AdminAnalytics, CategoryCount, OrganizerAnalytics},
        auth::{LoginRequest, LoginResponse, SignupRequest},
        bookings::{BookingList, BookingWithEvent, BookingWithEventList, CreateBookingRequest},
        events::{CreateEventRequest, EventList, UpdateEventRequest, UpdateEventStatusRequest},
        favorites::{AddFavoriteRequest, FavoriteEventList},
        users::{UpdateProfileRequest, UpdateRoleRequest, UserList},
        venues::{VenueList, VenueRequest},
    },
    models::{Booking, BookingStatus, Event, EventStatus, Favorite, Role, User, Venue},
    response::{ApiResponse, Meta},
    routes::{
        admin, auth, bookings, events, favorites, health, organizer, params, users, venues,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "PlanNGo API", description = "Event discovery, booking and management"),
    paths(
        health::health_check,
        auth::signup,
        auth::login,
        events::list_events,
        events::get_event,
        events::list_organizer_events,
        events::create_event,
        events::update_event,
        events::delete_event,
        bookings::create_booking,
        bookings::list_bookings,
        bookings::get_booking,
        bookings::list_user_bookings,
        bookings::cancel_booking,
        users::get_profile,
        users::update_profile,
        users::list_users,
        users::get_user,
        users::update_role,
        users::delete_user,
        venues::list_venues,
        venues::list_available_venues,
        venues::get_venue,
        venues::create_venue,
        venues::update_venue,
        venues::delete_venue,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        organizer::my_events,
        organizer::my_bookings,
        organizer::my_analytics,
        admin::list_events_for_review,
        admin::update_event_status,
        admin::analytics
    ),
    components(
        schemas(
            User,
            Role,
            Event,
            EventStatus,
            Booking,
            BookingStatus,
            Venue,
            Favorite,
            SignupRequest,
            LoginRequest,
            LoginResponse,
            CreateEventRequest,
            UpdateEventRequest,
            UpdateEventStatusRequest,
            EventList,
            CreateBookingRequest,
            BookingWithEvent,
            BookingList,
            BookingWithEventList,
            UpdateProfileRequest,
            UpdateRoleRequest,
            UserList,
            VenueRequest,
            VenueList,
            AddFavoriteRequest,
            FavoriteEventList,
            CategoryCount,
            AdminAnalytics,
            OrganizerAnalytics,
            params::Pagination,
            params::EventQuery,
            params::BookingListQuery,
            params::AdminEventQuery,
            Meta,
            ApiResponse<Event>,
            ApiResponse<EventList>,
            ApiResponse<Booking>,
            ApiResponse<BookingWithEventList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Signup and login"),
        (name = "Events", description = "Event catalogue"),
        (name = "Bookings", description = "Ticket bookings"),
        (name = "Users", description = "User profiles and administration"),
        (name = "Venues", description = "Venue directory"),
        (name = "Favorites", description = "Saved events"),
        (name = "Organizer", description = "Organizer dashboard"),
        (name = "Admin", description = "Event approval and platform analytics"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
