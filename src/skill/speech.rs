//! French phrasing of replies

use crate::catalog::Category;

pub const WHAT_NEXT: &str = "Que souhaitez-vous faire ?";

pub const HELP: &str = "Je peux vous donner les horaires des trams et bus TBM de Bordeaux en temps réel. \
     Dites « enregistre l'arrêt » suivi du nom de l'arrêt et de la ligne pour sauvegarder votre arrêt favori. \
     Ensuite, dites simplement « prochain passage » pour connaître les horaires. \
     Vous pouvez aussi dire « quel est mon arrêt » pour voir votre configuration.";

pub const FALLBACK: &str = "Désolé, je n'ai pas compris. \
     Vous pouvez dire « prochain passage » pour les horaires, ou « aide » pour plus d'informations.";

pub const GOODBYE: &str = "À bientôt sur TBM Horaires !";

pub const UPSTREAM_APOLOGY: &str =
    "Désolé, je n'ai pas pu récupérer les horaires. Réessayez dans quelques instants.";

pub const SAVE_APOLOGY: &str =
    "Désolé, je n'ai pas pu enregistrer votre arrêt. Réessayez dans quelques instants.";

pub const NO_FAVORITE: &str = "Vous n'avez pas encore d'arrêt favori configuré.";

pub const OFFER_FAVORITE: &str = "Voulez-vous en configurer un ?";

pub const NO_USER: &str =
    "Je ne peux pas enregistrer d'arrêt favori sans compte utilisateur associé.";

pub const NOT_CONFIGURED: &str = "Désolé, aucun arrêt par défaut n'est configuré.";

/// A departure ready to be read out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokenDeparture {
    /// Line as said in a sentence, e.g. "le tram C"
    pub line: String,
    pub destination: String,
    pub eta_minutes: i64,
}

/// "maintenant", "dans 1 minute", "dans 7 minutes"
#[must_use]
pub fn eta_phrase(minutes: i64) -> String {
    match minutes {
        ..=0 => "maintenant".to_string(),
        1 => "dans 1 minute".to_string(),
        n => format!("dans {n} minutes"),
    }
}

/// Read out the first departure, then up to `extra` following ones
///
/// Following departures of the same line and destination only repeat the
/// time. Returns `None` for an empty list.
#[must_use]
pub fn departures(list: &[SpokenDeparture], extra: usize) -> Option<String> {
    let (first, rest) = list.split_first()?;
    let mut text = format!(
        "{} passe {}{}.",
        capitalize(&first.line),
        eta_phrase(first.eta_minutes),
        direction_suffix(&first.destination)
    );

    let rest = &rest[..rest.len().min(extra)];
    if rest.is_empty() {
        return Some(text);
    }

    let same_service = rest
        .iter()
        .all(|d| d.line == first.line && d.destination == first.destination);
    let following: Vec<String> = if same_service {
        rest.iter().map(|d| eta_phrase(d.eta_minutes)).collect()
    } else {
        rest.iter()
            .map(|d| {
                format!(
                    "{} {}{}",
                    d.line,
                    eta_phrase(d.eta_minutes),
                    direction_suffix(&d.destination)
                )
            })
            .collect()
    };
    text.push_str(&format!(" Puis {}.", join(&following)));
    Some(text)
}

/// Nothing coming up within the preview window
#[must_use]
pub fn no_departures(line: Option<&str>, stop: &str) -> String {
    format!(
        "Il n'y a pas de passage prévu pour {} à {stop} dans les prochaines minutes.",
        line.unwrap_or("cette ligne")
    )
}

/// Upstream has no schedule at all for the stop
#[must_use]
pub fn no_schedule(stop: &str) -> String {
    format!("Aucun horaire n'est disponible pour l'arrêt {stop} pour le moment.")
}

/// "Quarante Journaux pour le tram C direction Villenave Pyrénées"
#[must_use]
pub fn favorite_summary(stop: &str, line: &str, destination: &str) -> String {
    format!("{stop} pour {line}{}", direction_suffix(destination))
}

#[must_use]
pub fn welcome(favorite: Option<&str>) -> String {
    favorite.map_or_else(
        || {
            "Bienvenue sur TBM Horaires ! \
             Je peux vous donner les prochains passages des trams et bus de Bordeaux. \
             Commencez par configurer votre arrêt en disant par exemple : \
             « enregistre l'arrêt Quinconces pour le tram C »."
                .to_string()
        },
        |summary| {
            format!(
                "Bienvenue sur TBM Horaires. Votre arrêt favori est {summary}. \
                 Dites « prochain passage » pour les horaires, ou « configurer » pour changer d'arrêt."
            )
        },
    )
}

#[must_use]
pub fn favorite(summary: &str) -> String {
    format!("Votre arrêt favori est {summary}.")
}

#[must_use]
pub fn saved(summary: &str) -> String {
    format!(
        "C'est noté ! J'ai enregistré l'arrêt {summary}. Dites « prochain passage » pour les horaires."
    )
}

/// Question asking for a slot
#[must_use]
pub const fn question(category: Category) -> &'static str {
    match category {
        Category::Stop => "Quel est le nom de l'arrêt ?",
        Category::Line => "Quelle ligne prenez-vous ?",
        Category::Direction => "Dans quelle direction allez-vous ?",
    }
}

/// A spoken value that matched nothing
#[must_use]
pub fn not_found(category: Category, fragment: &str) -> String {
    let what = match category {
        Category::Stop => "d'arrêt",
        Category::Line => "de ligne",
        Category::Direction => "de direction",
    };
    format!(
        "Je n'ai pas trouvé {what} correspondant à « {fragment} ». {}",
        question(category)
    )
}

#[must_use]
pub fn not_served(stop: &str, line: &str) -> String {
    format!(
        "L'arrêt {stop} n'est pas desservi par {line}. {}",
        question(Category::Line)
    )
}

#[must_use]
pub fn lines(names: &[String]) -> String {
    if names.is_empty() {
        return "Je ne connais aucune ligne pour le moment.".to_string();
    }
    format!(
        "Les lignes disponibles sont : {}. \
         Pour configurer votre arrêt, dites par exemple : « enregistre l'arrêt Quinconces pour le tram C ».",
        join(names)
    )
}

fn direction_suffix(destination: &str) -> String {
    if destination.is_empty() {
        String::new()
    } else {
        format!(" direction {destination}")
    }
}

/// "a", "a et b", "a, b et c"
fn join(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} et {last}", head.join(", ")),
    }
}

/// Uppercase the first character
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departure(line: &str, destination: &str, eta: i64) -> SpokenDeparture {
        SpokenDeparture {
            line: line.to_string(),
            destination: destination.to_string(),
            eta_minutes: eta,
        }
    }

    #[test]
    fn test_single_departure() {
        let text = departures(&[departure("le tram C", "Villenave Pyrénées", 4)], 2).unwrap();
        assert_eq!(text, "Le tram C passe dans 4 minutes direction Villenave Pyrénées.");
    }

    #[test]
    fn test_following_same_service() {
        let list = [
            departure("le tram C", "Villenave Pyrénées", 0),
            departure("le tram C", "Villenave Pyrénées", 1),
            departure("le tram C", "Villenave Pyrénées", 12),
            departure("le tram C", "Villenave Pyrénées", 25),
        ];
        let text = departures(&list, 2).unwrap();
        assert_eq!(
            text,
            "Le tram C passe maintenant direction Villenave Pyrénées. \
             Puis dans 1 minute et dans 12 minutes."
        );
    }

    #[test]
    fn test_following_mixed_services() {
        let list = [
            departure("le tram B", "Berges de la Garonne", 3),
            departure("le tram C", "Parc des Expositions", 5),
        ];
        let text = departures(&list, 2).unwrap();
        assert!(text.ends_with("Puis le tram C dans 5 minutes direction Parc des Expositions."));
    }

    #[test]
    fn test_empty_departures() {
        assert!(departures(&[], 2).is_none());
        assert!(no_departures(None, "Gambetta").contains("cette ligne"));
    }

    #[test]
    fn test_join() {
        let items = ["Tram A", "Tram B", "Tram C"].map(String::from);
        assert_eq!(join(&items), "Tram A, Tram B et Tram C");
        assert_eq!(join(&items[..1]), "Tram A");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("la liane 1"), "La liane 1");
        assert_eq!(capitalize("éte"), "Éte");
        assert_eq!(capitalize(""), "");
    }
}
