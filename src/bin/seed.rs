use chrono::{DateTime, Utc};
use planngo_api::{
    config::AppConfig,
    db::create_pool,
    models::{EventStatus, Role},
    services::auth_service::hash_password,
};
use uuid::Uuid;

struct SeedEvent {
    title: &'static str,
    description: &'static str,
    category: &'static str,
    date: &'static str,
    location: &'static str,
    price: i64,
    capacity: i32,
    booked: i32,
    image_url: &'static str,
}

const EVENTS: [SeedEvent; 4] = [
    SeedEvent {
        title: "Tech Conference 2024",
        description: "Join us for the biggest tech conference of the year featuring industry leaders and innovative workshops.",
        category: "Technology",
        date: "2027-06-15T09:00:00+05:30",
        location: "Mumbai",
        price: 2999,
        capacity: 500,
        booked: 342,
        image_url: "https://images.unsplash.com/photo-1540575467063-178a50c2df87?w=800",
    },
    SeedEvent {
        title: "Summer Music Festival",
        description: "Experience three days of amazing music with top artists from around the world.",
        category: "Music",
        date: "2027-07-20T18:00:00+05:30",
        location: "Bangalore",
        price: 1500,
        capacity: 2000,
        booked: 1850,
        image_url: "https://images.unsplash.com/photo-1459749411175-04bf5292ceea?w=800",
    },
    SeedEvent {
        title: "Art Exhibition: Modern Masters",
        description: "Explore contemporary art from renowned artists in an immersive gallery experience.",
        category: "Art",
        date: "2027-05-10T10:00:00+05:30",
        location: "Delhi",
        price: 500,
        capacity: 300,
        booked: 0,
        image_url: "https://images.unsplash.com/photo-1531243269054-5ebf6f34081e?w=800",
    },
    SeedEvent {
        title: "Startup Pitch Night",
        description: "Founders pitch to a panel of investors, followed by networking.",
        category: "Business",
        date: "2027-08-05T19:00:00+05:30",
        location: "Pune",
        price: 799,
        capacity: 150,
        booked: 0,
        image_url: "https://images.unsplash.com/photo-1559136555-9303baea8ebd?w=800",
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "Admin", "admin@planngo.com", "admin123", Role::Admin).await?;
    let organizer_id =
        ensure_user(&pool, "Tech Events Inc", "organizer@planngo.com", "organizer123", Role::Organizer)
            .await?;
    let client_id = ensure_user(&pool, "Rahul Sharma", "user@planngo.com", "user123", Role::Client).await?;

    let venue_id = seed_venue(&pool).await?;
    seed_events(&pool, organizer_id, venue_id).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, Organizer ID: {organizer_id}, Client ID: {client_id}"
    );
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, phone, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind("9876543210")
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={})", role.as_str());
    Ok(user_id)
}

async fn seed_venue(pool: &sqlx::PgPool) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM venues WHERE venue_name = $1")
        .bind("Bandra Kurla Complex")
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO venues (id, venue_name, location, capacity, address, city, state, postal_code, amenities)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("Bandra Kurla Complex")
    .bind("Mumbai")
    .bind(5000)
    .bind("G Block, Bandra East")
    .bind("Mumbai")
    .bind("Maharashtra")
    .bind("400051")
    .bind("Parking, WiFi, Catering")
    .fetch_one(pool)
    .await?;

    println!("Seeded venue");
    Ok(id)
}

async fn seed_events(pool: &sqlx::PgPool, organizer_id: Uuid, venue_id: Uuid) -> anyhow::Result<()> {
    for event in EVENTS.iter() {
        let event_date: DateTime<Utc> = DateTime::parse_from_rfc3339(event.date)?.with_timezone(&Utc);
        let venue = (event.location == "Mumbai").then_some(venue_id);

        sqlx::query(
            r#"
            INSERT INTO events
                (id, title, description, category, event_date, location, venue_id,
                 price, capacity, booked, organizer_id, status, image_url)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13
            WHERE NOT EXISTS (SELECT 1 FROM events WHERE title = $2)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.title)
        .bind(event.description)
        .bind(event.category)
        .bind(event_date)
        .bind(event.location)
        .bind(venue)
        .bind(event.price)
        .bind(event.capacity)
        .bind(event.booked)
        .bind(organizer_id)
        .bind(EventStatus::Approved.as_str())
        .bind(event.image_url)
        .execute(pool)
        .await?;
    }

    println!("Seeded events");
    Ok(())
}
