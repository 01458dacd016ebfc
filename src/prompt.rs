use crate::models::BirthProfile;

pub const MILESTONE_AGES: [i32; 5] = [13, 18, 21, 30, 40];

fn milestone_label(age: i32) -> &'static str {
    match age {
        13 => "coming of age",
        18 => "legal adulthood in many countries",
        21 => "another milestone of adulthood",
        30 => "entering a new decade of life",
        40 => "mid-life milestone",
        _ => "milestone",
    }
}

/// Build the instruction sent to the completion service.
///
/// Only milestones the person has already reached by `current_year` are listed,
/// so the prompt itself never mentions a year in the future.
pub fn build_prompt(profile: &BirthProfile, current_year: i32) -> String {
    let dob = profile.date_of_birth();
    let birth_year = profile.birth_year;
    let country = profile.country.trim();
    let genre = match profile.genre.trim() {
        "" => "any genre",
        g => g,
    };

    let milestones: Vec<String> = MILESTONE_AGES
        .iter()
        .filter(|age| birth_year + **age <= current_year)
        .map(|age| {
            format!(
                "- Songs from the year they turned {} ({}), i.e. {}",
                age,
                milestone_label(*age),
                birth_year + age
            )
        })
        .collect();
    let milestones = if milestones.is_empty() {
        "- They have not reached any of the milestone ages yet; focus on songs from their lifetime so far".to_string()
    } else {
        milestones.join("\n")
    };

    format!(
        r#"Given the birth date {dob} (birth year {birth_year}) and country {country}, generate a playlist of popular songs that are significant to the person's life. Their preferred genre is {genre}.

The current year is {current_year}. Include songs for these milestone ages, and skip any milestone age (13, 18, 21, 30, 40) the person has not reached yet:
{milestones}

Also include:
- Songs related to significant global or national events in {country} during their lifetime, such as major sporting events, political milestones and cultural phenomena
- Songs popular when they likely finished secondary school (around age 18)
- Songs popular when they likely finished university (around age 21-22), if they have reached that age

Rules:
- Never include songs released after {current_year}
- Never include songs released before {birth_year}
- Favour {genre} where it fits, but do not limit the playlist to that genre
- Return between 15 and 20 songs, listed in chronological order by year of release (ascending)

For each song, provide:
- Year of release
- Song title
- Artist
- Brief explanation of why it's significant

Respond with a strict JSON array of objects and nothing else. Each object must contain exactly the fields "year", "title", "artist" and "significance".

Example format:
[
  {{
    "year": {birth_year},
    "title": "Example Song",
    "artist": "Example Artist",
    "significance": "Top chart hit in {country} the year you were born"
  }}
]"#
    )
}
