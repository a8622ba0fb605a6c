//! Static field spec registry for the catalog entities.
//!
//! One declarative spec per entity, mirrored by validation, compilation
//! and the generated query docs alike. The entity identifier is a plain
//! enum handed explicitly to the service; nothing here is discovered at
//! runtime.

use cinekit_query::{ConfigError, EntityFieldSpec, SpecRegistry};

/// Enumerated catalog entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    Movie,
    Person,
    Review,
    Season,
    Image,
}

impl Entity {
    pub const ALL: [Entity; 5] = [
        Entity::Movie,
        Entity::Person,
        Entity::Review,
        Entity::Season,
        Entity::Image,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Entity::Movie => "movie",
            Entity::Person => "person",
            Entity::Review => "review",
            Entity::Season => "season",
            Entity::Image => "image",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// IMDB identifiers look like `tt0111161`.
const IMDB_ID_PATTERN: &str = r"^tt\d+$";

fn movie() -> Result<EntityFieldSpec, ConfigError> {
    EntityFieldSpec::builder("movie")
        .allow_fields_find_all(&[
            "id",
            "externalId",
            "name",
            "alternativeName",
            "enName",
            "names",
            "type",
            "year",
            "description",
            "shortDescription",
            "movieLength",
            "rating",
            "votes",
            "poster",
            "horizontalPoster",
            "logo",
            "color",
            "watchability",
            "releaseYears",
        ])
        .id_keys(&["id", "externalId.imdb"])
        .alt_id_pattern("externalId.imdb", IMDB_ID_PATTERN)
        .regex_search_keys(&[
            "name",
            "alternativeName",
            "enName",
            "names.name",
            "tagline",
            "slogan",
            "description",
            "persons.name",
            "persons.enName",
            "persons.description",
        ])
        .date_search_keys(&[
            "premiere.world",
            "premiere.russia",
            "premiere.digital",
            "premiere.bluray",
            "premiere.dvd",
        ])
        .number_search_keys(&[
            "externalId.tmdb",
            "typeNumber",
            "movieLength",
            "year",
            "rating.kp",
            "rating.imdb",
            "rating.tmdb",
            "rating.filmCritics",
            "rating.russianFilmCritics",
            "rating.await",
            "votes.kp",
            "votes.imdb",
            "votes.tmdb",
            "votes.filmCritics",
            "votes.russianFilmCritics",
            "votes.await",
            "ratingAgeLimits",
            "ageRating",
            "persons.id",
            "budget.value",
            "fees.world",
            "fees.usa",
            "fees.russia",
            "image.postersCount",
            "image.backdropsCount",
            "image.framesCount",
            "reviewInfo.count",
            "reviewInfo.positiveCount",
            "seasonsInfo.number",
            "seasonsInfo.episodesCount",
            "videos.trailers.size",
            "videos.teasers.size",
        ])
        .excluded_values_fields(&["genres.name", "countries.name"])
        .blacklist_fields(&["_id"])
        .build()
}

fn person() -> Result<EntityFieldSpec, ConfigError> {
    EntityFieldSpec::builder("person")
        .allow_fields_find_all(&["id", "name", "enName", "photo", "age", "sex"])
        .id_keys(&["id"])
        .regex_search_keys(&[
            "name",
            "enName",
            "movies.name",
            "slogan",
            "description",
            "persons.name",
            "persons.enName",
            "persons.description",
        ])
        .date_search_keys(&["birthday", "death"])
        .number_search_keys(&[
            "movies.id",
            "movies.rating",
            "age",
            "countAwards",
            "growth",
            "spouses.id",
            "spouses.children",
            "spouses.name",
        ])
        .blacklist_fields(&[
            "_id",
            "profession._id",
            "birthPlace._id",
            "deathPlace._id",
            "facts._id",
            "movies._id",
            "isParse",
        ])
        .build()
}

fn review() -> Result<EntityFieldSpec, ConfigError> {
    EntityFieldSpec::builder("review")
        .allow_fields_find_all(&["movieId", "id", "title", "type", "review", "author", "date"])
        .id_keys(&["id"])
        .date_search_keys(&["date"])
        .number_search_keys(&["movieId"])
        .blacklist_fields(&["_id"])
        .build()
}

fn season() -> Result<EntityFieldSpec, ConfigError> {
    EntityFieldSpec::builder("season")
        .allow_fields_find_all(&[
            "movieId",
            "number",
            "episodesCount",
            "episodes.number",
            "episodes.name",
            "episodes.enName",
            "episodes.date",
            "episodes.description",
        ])
        .id_keys(&["id"])
        .date_search_keys(&["episodes.date"])
        .number_search_keys(&["movieId", "number", "episodesCount", "episodes.number"])
        .blacklist_fields(&["_id", "episodes._id"])
        .build()
}

fn image() -> Result<EntityFieldSpec, ConfigError> {
    EntityFieldSpec::builder("image")
        .allow_fields_find_all(&[
            "url",
            "previewUrl",
            "width",
            "height",
            "language",
            "type",
            "movieId",
        ])
        .id_keys(&["id"])
        .number_search_keys(&["movieId", "height", "width"])
        .blacklist_fields(&["_id"])
        .build()
}

/// Build the full catalog registry.
///
/// Called once at process start; a [`ConfigError`] here must abort boot.
///
/// # Errors
///
/// Returns the first spec that violates registry invariants.
pub fn build_registry() -> Result<SpecRegistry, ConfigError> {
    SpecRegistry::builder()
        .register(movie()?)
        .register(person()?)
        .register(review()?)
        .register(season()?)
        .register(image()?)
        .build()
}
