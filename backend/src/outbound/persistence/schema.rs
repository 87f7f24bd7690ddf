//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. The
//! `diesel print-schema` command can regenerate them from a live database.

diesel::table! {
    /// Accounts. `email` is stored lowercased and unique.
    users (id) {
        id -> Uuid,
        first_name -> Varchar,
        last_name -> Varchar,
        email -> Varchar,
        role -> Varchar,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    categories (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
    }
}

diesel::table! {
    courses (id) {
        id -> Uuid,
        instructor_id -> Uuid,
        category_id -> Uuid,
        title -> Varchar,
        description -> Text,
        what_you_will_learn -> Text,
        /// Price in minor currency units.
        price_minor -> Int8,
        tags -> Array<Text>,
        instructions -> Array<Text>,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Enrolled set of each course and course list of each user.
    course_enrollments (course_id, user_id) {
        course_id -> Uuid,
        user_id -> Uuid,
        enrolled_at -> Timestamptz,
    }
}

diesel::table! {
    sections (id) {
        id -> Uuid,
        course_id -> Uuid,
        name -> Varchar,
        /// Insertion order within the course.
        position -> Int8,
    }
}

diesel::table! {
    subsections (id) {
        id -> Uuid,
        section_id -> Uuid,
        title -> Varchar,
        description -> Text,
        duration_secs -> Int4,
        video_url -> Text,
        position -> Int8,
    }
}

diesel::table! {
    course_progress (course_id, user_id) {
        course_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    completed_subsections (course_id, user_id, subsection_id) {
        course_id -> Uuid,
        user_id -> Uuid,
        subsection_id -> Uuid,
        completed_at -> Timestamptz,
    }
}

diesel::table! {
    /// One rating per (user, course).
    ratings (id) {
        id -> Uuid,
        user_id -> Uuid,
        course_id -> Uuid,
        score -> Int2,
        review -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(subsections -> sections (section_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    categories,
    courses,
    course_enrollments,
    sections,
    subsections,
    course_progress,
    completed_subsections,
    ratings,
);
