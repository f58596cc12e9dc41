use scraper::{ElementRef, Html};
use tracing::info;

use super::models::{About, PersonDetails, StaffPosition, VoiceActingRole};
use crate::error::Result;
use crate::extract::reader::{
    absolute_url, attr, first, first_attr, first_text, labelled_value, lazy_src, non_empty_text,
};
use crate::extract::{Chain, Stage, region, stage};
use crate::selector;

pub fn parse_person(html: &str, base: &str) -> Result<PersonDetails> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let content = region(root, selector!("div#content"), "person page")?;

    let name = Chain::new()
        .text(selector!("h1.title-name strong"))
        .text(selector!("h1.title-name"))
        .or("")
        .read(Some(root));
    let image_url = first(content, selector!("div[style*=\"text-align: center;\"] img")).and_then(lazy_src);

    let label = selector!("span.dark_text");
    let info = |name: &str| labelled_value(content, label, name);
    let alternate_names = info("Alternate names:")
        .map(|names| {
            names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let about = stage(Stage::Biography, || {
        let more = region(content, selector!(".people-informantion-more"), "about")?;
        Ok(parse_about(&more.text().collect::<String>()))
    });
    let voice_acting_roles = stage(Stage::Cast, || voice_acting_roles(content, base));
    let anime_staff_positions = stage(Stage::Cast, || staff_positions(content, base));

    info!(
        name = %name,
        roles = voice_acting_roles.len(),
        positions = anime_staff_positions.len(),
        "Parsed person details"
    );
    Ok(PersonDetails {
        name,
        image_url,
        given_name: info("Given name:"),
        family_name: info("Family name:"),
        alternate_names,
        birthday: info("Birthday:"),
        about,
        voice_acting_roles,
        anime_staff_positions,
    })
}

/// Splits the free-text biography into its parts.
///
/// Lines before the first section marker are `key: value` personal info,
/// or background prose when they have no colon.
pub fn parse_about(text: &str) -> About {
    enum Section {
        PersonalInfo,
        Awards,
        Profile,
        SocialMedia,
    }

    let mut about = About::default();
    let mut section = Section::PersonalInfo;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.contains("(Source:") {
            continue;
        }
        if line.starts_with("Awards:") {
            section = Section::Awards;
        } else if line.starts_with("Profile:") {
            section = Section::Profile;
        } else if line.starts_with("Twitter:") {
            section = Section::SocialMedia;
        } else {
            match section {
                Section::PersonalInfo => match line.split_once(':') {
                    Some((key, value)) => {
                        about
                            .personal_info
                            .insert(key.trim().to_string(), value.trim().to_string());
                    }
                    None => about.background.push(line.to_string()),
                },
                Section::Awards => match line.strip_prefix("- ") {
                    Some(award) => about.awards.push(award.to_string()),
                    None => about.background.push(line.to_string()),
                },
                Section::Profile => about
                    .profile
                    .extend(line.split(", ").map(str::to_string)),
                Section::SocialMedia => {
                    let entry = if line.starts_with('@') {
                        line.split_once(' ')
                            .map(|(handle, rest)| (handle, rest.trim().trim_matches(|c: char| c == '(' || c == ')')))
                    } else {
                        line.split_once(':').map(|(key, value)| (key.trim(), value.trim()))
                    };
                    match entry {
                        Some((key, value)) => {
                            about.social_media.insert(key.to_string(), value.to_string());
                        }
                        None => about.background.push(line.to_string()),
                    }
                }
            }
        }
    }
    about
}

fn voice_acting_roles(content: ElementRef<'_>, base: &str) -> Result<Vec<VoiceActingRole>> {
    let table = region(content, selector!("table.js-table-people-character"), "voice acting roles")?;
    Ok(table
        .select(selector!("tr"))
        .filter_map(|row| {
            let anime = first(row, selector!("td:nth-child(2) a.js-people-title"))?;
            let character = first(row, selector!("td:nth-child(3) a"))?;
            Some(VoiceActingRole {
                anime_name: non_empty_text(anime)?,
                anime_url: attr(anime, "href").map(|href| absolute_url(base, &href)),
                anime_image: first_attr(row, selector!("td:nth-child(1) img"), "data-src"),
                character_name: non_empty_text(character)?,
                character_url: attr(character, "href").map(|href| absolute_url(base, &href)),
                character_image: first_attr(row, selector!("td:nth-child(4) img"), "data-src"),
                role: first_text(row, selector!("td:nth-child(3) div:nth-child(2)"))
                    .unwrap_or_else(|| "Unknown".to_string()),
            })
        })
        .collect())
}

fn staff_positions(content: ElementRef<'_>, base: &str) -> Result<Vec<StaffPosition>> {
    let table = region(content, selector!("table.js-table-people-staff"), "staff positions")?;
    Ok(table
        .select(selector!("tr"))
        .filter_map(|row| {
            let anime = first(row, selector!("td:nth-child(2) a.js-people-title"))?;
            Some(StaffPosition {
                anime: non_empty_text(anime)?,
                anime_url: attr(anime, "href").map(|href| absolute_url(base, &href)),
                anime_image: first_attr(row, selector!("td:nth-child(1) img"), "data-src"),
                position: first_text(row, selector!("td:nth-child(2) small"))?,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <h1 class="title-name h1_bold_none"><strong>Kana Hanazawa</strong></h1>
        <div id="content"><table><tr>
        <td class="borderClass" width="225" valign="top">
            <div style="text-align: center;"><img class="lazyload" data-src="https://cdn.myanimelist.net/images/voiceactors/2/60638.jpg"></div>
            <div class="spaceit_pad"><span class="dark_text">Given name:</span> 香菜</div>
            <span class="dark_text">Family name:</span> 花澤
            <div class="spaceit_pad"><span class="dark_text">Alternate names:</span> Hanazawa Kana, Kanabun</div>
            <div class="spaceit_pad"><span class="dark_text">Birthday:</span>  Feb 25, 1989</div>
            <div class="people-informantion-more js-people-informantion-more">Birth place: Tokyo, Japan
Blood type: A
Started as a child actress.
Awards:
- Best Lead Actress (2013)
Profile:
Anime, Games
Twitter:
@hanazawa_staff (staff account)
(Source: Wikipedia)</div>
        </td>
        <td valign="top" style="padding-left: 5px;">
            <table class="js-table-people-character">
                <tr>
                    <td><img data-src="https://cdn.myanimelist.net/images/anime/1.jpg"></td>
                    <td><a class="js-people-title" href="/anime/28851/Koe_no_Katachi">Koe no Katachi</a></td>
                    <td><a href="/character/80491/Shouko_Nishimiya">Nishimiya, Shouko</a><div>Main</div></td>
                    <td><img data-src="https://cdn.myanimelist.net/images/characters/1.jpg"></td>
                </tr>
                <tr><td>no title link</td></tr>
            </table>
            <table class="js-table-people-staff">
                <tr>
                    <td><img data-src="https://cdn.myanimelist.net/images/anime/2.jpg"></td>
                    <td><a class="js-people-title" href="/anime/2/Song">Song</a><div><small>Theme Song Performance</small></div></td>
                </tr>
            </table>
        </td></tr></table></div></body></html>"#;

    #[test]
    fn test_person_fields() {
        let person = parse_person(PAGE, "https://myanimelist.net").unwrap();
        assert_eq!(person.name, "Kana Hanazawa");
        assert_eq!(person.given_name.as_deref(), Some("香菜"));
        assert_eq!(person.family_name.as_deref(), Some("花澤"));
        assert_eq!(person.alternate_names, ["Hanazawa Kana", "Kanabun"]);
        assert_eq!(person.birthday.as_deref(), Some("Feb 25, 1989"));
        assert_eq!(
            person.image_url.as_deref(),
            Some("https://cdn.myanimelist.net/images/voiceactors/2/60638.jpg")
        );
    }

    #[test]
    fn test_roles_and_positions() {
        let person = parse_person(PAGE, "https://myanimelist.net").unwrap();
        assert_eq!(person.voice_acting_roles.len(), 1);
        let role = &person.voice_acting_roles[0];
        assert_eq!(role.anime_name, "Koe no Katachi");
        assert_eq!(role.character_name, "Nishimiya, Shouko");
        assert_eq!(role.role, "Main");
        assert_eq!(
            role.character_url.as_deref(),
            Some("https://myanimelist.net/character/80491/Shouko_Nishimiya")
        );

        assert_eq!(person.anime_staff_positions.len(), 1);
        assert_eq!(person.anime_staff_positions[0].position, "Theme Song Performance");
    }

    #[test]
    fn test_about_sections() {
        let person = parse_person(PAGE, "https://myanimelist.net").unwrap();
        let about = &person.about;
        assert_eq!(about.personal_info.get("Birth place").map(String::as_str), Some("Tokyo, Japan"));
        assert_eq!(about.personal_info.get("Blood type").map(String::as_str), Some("A"));
        assert_eq!(about.background, ["Started as a child actress."]);
        assert_eq!(about.awards, ["Best Lead Actress (2013)"]);
        assert_eq!(about.profile, ["Anime", "Games"]);
        assert_eq!(
            about.social_media.get("@hanazawa_staff").map(String::as_str),
            Some("staff account")
        );
    }
}
