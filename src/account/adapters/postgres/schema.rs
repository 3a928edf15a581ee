//! Diesel schema for user accounts.

diesel::table! {
    /// Registered users with their profile details.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Normalised email address.
        #[max_length = 254]
        email -> Varchar,
        /// Given name.
        #[max_length = 30]
        first_name -> Varchar,
        /// Family name.
        #[max_length = 30]
        last_name -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// Whether sign-in is allowed.
        is_active -> Bool,
        /// Biography.
        bio -> Text,
        /// Phone number.
        #[max_length = 20]
        phone -> Varchar,
        /// Company.
        #[max_length = 100]
        company -> Varchar,
        /// Job title.
        #[max_length = 100]
        job_title -> Varchar,
        /// Location.
        #[max_length = 100]
        location -> Varchar,
        /// Last sign-in.
        last_login -> Nullable<Timestamptz>,
        /// Registration timestamp.
        date_joined -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}
