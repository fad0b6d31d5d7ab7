//! GraphQL query builders for the Mediux API.
//!
//! The API is a Directus GraphQL endpoint: listings filter on the TMDB
//! id of the parent show/movie/collection, single sets come from the
//! `*_by_id` queries.

use postersync_core::TmdbId;

const SHOW_SET_FIELDS: &str = "\
id \
set_title \
date_updated \
user_created { username } \
files { id file_type show { id } season { id } episode { id } } \
show_id { id title first_air_date seasons { id season_name season_number \
episodes { id episode_title episode_number } } }";

const MOVIE_SET_FIELDS: &str = "\
id \
set_title \
date_updated \
user_created { username } \
files { id file_type movie { id } } \
movie_id { id title release_date }";

const COLLECTION_SET_FIELDS: &str = "\
id \
set_title \
date_updated \
user_created { username } \
files { id file_type movie { id } collection { id } } \
collection_id { id collection_name movies { id title release_date } }";

pub fn show_sets(tmdb_id: TmdbId) -> String {
    format!(
        "query {{ show_sets(filter: {{ show_id: {{ id: {{ _eq: \"{tmdb_id}\" }} }} }}) \
         {{ {SHOW_SET_FIELDS} }} }}"
    )
}

pub fn show_set_by_id(set_id: u64) -> String {
    format!("query {{ show_sets_by_id(id: {set_id}) {{ {SHOW_SET_FIELDS} }} }}")
}

pub fn movie_sets(tmdb_id: TmdbId) -> String {
    format!(
        "query {{ movie_sets(filter: {{ movie_id: {{ id: {{ _eq: \"{tmdb_id}\" }} }} }}) \
         {{ {MOVIE_SET_FIELDS} }} }}"
    )
}

pub fn movie_set_by_id(set_id: u64) -> String {
    format!("query {{ movie_sets_by_id(id: {set_id}) {{ {MOVIE_SET_FIELDS} }} }}")
}

pub fn collection_sets(tmdb_id: TmdbId) -> String {
    format!(
        "query {{ collection_sets(filter: {{ collection_id: {{ id: {{ _eq: \"{tmdb_id}\" }} }} }}) \
         {{ {COLLECTION_SET_FIELDS} }} }}"
    )
}

pub fn collection_set_by_id(set_id: u64) -> String {
    format!("query {{ collection_sets_by_id(id: {set_id}) {{ {COLLECTION_SET_FIELDS} }} }}")
}
