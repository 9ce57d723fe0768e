//! ナレーション台本生成
//!
//! 照合したサイト情報から音声ガイドの台本を組み立てる。
//! - 英語 / スペイン語
//! - 再生時間（分）に応じて段落と豆知識の数を変える
//! - 欠けているサイト情報は既定文で補う
//!
//! 導入文と締めの文は同じサイトなら常に同じものを選ぶ。

use crate::error::{Error, Result};
use crate::types::CulturalSite;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ナレーション言語
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
}

impl Language {
    /// Vision API等に渡す言語ヒント
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "spanish" | "es" | "español" => Ok(Language::Spanish),
            _ => Err(format!("Unknown language: {}. Use english or spanish", s)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "english"),
            Language::Spanish => write!(f, "spanish"),
        }
    }
}

/// 台本生成オプション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationOptions {
    pub language: Language,
    /// 想定再生時間（分）
    pub duration_minutes: u8,
}

impl Default for NarrationOptions {
    fn default() -> Self {
        Self {
            language: Language::English,
            duration_minutes: 3,
        }
    }
}

impl NarrationOptions {
    /// 盛り込む豆知識の数（1分→1, 3分→2, それ以外→3）
    pub fn fact_count(&self) -> usize {
        match self.duration_minutes {
            1 => 1,
            3 => 2,
            _ => 3,
        }
    }

    fn is_extended(&self) -> bool {
        self.duration_minutes >= 3
    }
}

/// 既定値を補ったサイト情報
struct SiteText<'a> {
    name: &'a str,
    description: &'a str,
    historical_context: &'a str,
    cultural_significance: &'a str,
    city: &'a str,
    country: &'a str,
    construction_date: &'a str,
    architect: &'a str,
    facts: Vec<&'a str>,
    tips: &'a str,
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

impl<'a> SiteText<'a> {
    fn new(site: &'a CulturalSite, language: Language) -> Self {
        let spanish = language == Language::Spanish;
        let pick = |en: &'a str, es: &'a str| if spanish { es } else { en };

        let facts: Vec<&str> = site
            .fun_facts
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect();

        Self {
            name: site.name.trim(),
            description: or_default(
                &site.description,
                pick("A remarkable cultural site.", "Un sitio cultural notable."),
            ),
            historical_context: or_default(
                &site.historical_context,
                pick(
                    "This site has a rich historical background.",
                    "Este sitio tiene un rico trasfondo histórico.",
                ),
            ),
            cultural_significance: or_default(
                &site.cultural_significance,
                pick("great cultural importance", "una gran importancia cultural"),
            ),
            city: or_default(&site.location_city, pick("this city", "esta ciudad")),
            country: or_default(&site.location_country, pick("the world", "el mundo")),
            construction_date: or_default(
                &site.construction_date,
                pick("an unknown date", "una fecha desconocida"),
            ),
            architect: site.architect_artist.trim(),
            facts: if facts.is_empty() {
                vec![pick(
                    "This site has fascinated visitors for generations",
                    "Este sitio ha fascinado a los visitantes durante generaciones",
                )]
            } else {
                facts
            },
            tips: site.visitor_tips.trim(),
        }
    }
}

/// 文字列から決定的に候補を選ぶ
fn choose<'a>(candidates: &[&'a str], seed: &str) -> &'a str {
    let sum: usize = seed.bytes().map(|b| b as usize).sum();
    candidates[sum % candidates.len()]
}

/// 台本を生成
///
/// サイトIDと名前は必須。
pub fn generate_script(site: &CulturalSite, options: &NarrationOptions) -> Result<String> {
    if site.id.trim().is_empty() || site.name.trim().is_empty() {
        return Err(Error::InvalidInput("site id and name are required".into()));
    }

    let text = SiteText::new(site, options.language);
    let script = match options.language {
        Language::English => english_script(&text, &site.id, options),
        Language::Spanish => spanish_script(&text, &site.id, options),
    };
    Ok(script)
}

fn english_script(t: &SiteText<'_>, seed: &str, options: &NarrationOptions) -> String {
    let hooks = [
        format!("Welcome to {}, one of {}'s most magnificent cultural treasures!", t.name, t.country),
        format!("Standing before you is {}, a masterpiece that has captivated visitors for centuries.", t.name),
        format!("You're about to discover the incredible story of {}, a testament to human creativity and ambition.", t.name),
        format!("Prepare to be amazed by {}, where history, art, and culture converge in perfect harmony.", t.name),
    ];
    let hook_refs: Vec<&str> = hooks.iter().map(String::as_str).collect();

    let mut script = format!("{}\n\n", choose(&hook_refs, seed));

    let builder = if t.architect.is_empty() {
        String::new()
    } else {
        format!(" by {}", t.architect)
    };
    script.push_str(&format!(
        "{} This remarkable structure, built in {}{}, stands as a powerful symbol of {}.\n\n",
        t.description, t.construction_date, builder, t.cultural_significance
    ));

    script.push_str(&format!(
        "Let me take you back in time. {} Imagine the world when this place was created: the people, the challenges, the vision that brought it to life.\n\n",
        t.historical_context
    ));

    if options.is_extended() {
        script.push_str(&format!(
            "As you explore {}, notice the details that make it so extraordinary. Every stone and every carving tells a story of craftsmanship and meaning.\n\n",
            t.name
        ));
    }

    let facts: Vec<&str> = t.facts.iter().copied().take(options.fact_count()).collect();
    script.push_str(&format!(
        "Here are some fascinating details to make your visit even more special: {}.\n\n",
        facts.join(". ")
    ));

    if !t.tips.is_empty() {
        script.push_str(&format!(
            "Before you continue, here's a helpful tip: {}\n\n",
            t.tips
        ));
    }

    if options.is_extended() {
        script.push_str(&format!(
            "Take a moment to reflect. {} is not just a monument; it is a bridge between past and present.\n\n",
            t.name
        ));
    }

    script.push_str(&format!(
        "You're standing in {}, a place shaped by centuries of history. {} is part of its soul and a symbol of its heritage.\n\n",
        t.city, t.name
    ));

    let closings = [
        format!("Thank you for visiting {}. May this experience inspire you to explore more of the world's cultural treasures.", t.name),
        format!("As you leave {}, carry with you the sense of wonder this place embodies. Thank you for being part of its story.", t.name),
        format!("Your visit to {} is now part of its living history. Thank you for taking the time to connect with it.", t.name),
    ];
    let closing_refs: Vec<&str> = closings.iter().map(String::as_str).collect();
    script.push_str(choose(&closing_refs, t.name));

    script
}

fn spanish_script(t: &SiteText<'_>, seed: &str, options: &NarrationOptions) -> String {
    let hooks = [
        format!("¡Bienvenidos a {}, uno de los tesoros culturales más magníficos de {}!", t.name, t.country),
        format!("Ante ustedes se encuentra {}, una obra maestra que ha cautivado a visitantes durante siglos.", t.name),
        format!("Están a punto de descubrir la increíble historia de {}, un testimonio de la creatividad humana.", t.name),
        format!("Prepárense para maravillarse con {}, donde la historia, el arte y la cultura convergen.", t.name),
    ];
    let hook_refs: Vec<&str> = hooks.iter().map(String::as_str).collect();

    let mut script = format!("{}\n\n", choose(&hook_refs, seed));

    let builder = if t.architect.is_empty() {
        String::new()
    } else {
        format!(" por {}", t.architect)
    };
    script.push_str(&format!(
        "{} Esta extraordinaria estructura, construida en {}{}, representa {}.\n\n",
        t.description, t.construction_date, builder, t.cultural_significance
    ));

    script.push_str(&format!(
        "Permítanme llevarlos de vuelta en el tiempo. {} Imaginen el mundo cuando se creó este lugar.\n\n",
        t.historical_context
    ));

    if options.is_extended() {
        script.push_str(&format!(
            "Mientras exploran {}, noten los detalles que lo hacen tan extraordinario. Cada piedra cuenta una historia.\n\n",
            t.name
        ));
    }

    let facts: Vec<&str> = t.facts.iter().copied().take(options.fact_count()).collect();
    script.push_str(&format!(
        "Aquí tienen algunos detalles fascinantes: {}.\n\n",
        facts.join(". ")
    ));

    if !t.tips.is_empty() {
        script.push_str(&format!("Un consejo útil para su visita: {}\n\n", t.tips));
    }

    if options.is_extended() {
        script.push_str(&format!(
            "Tómense un momento para reflexionar. {} no es solo un monumento; es un puente entre el pasado y el presente.\n\n",
            t.name
        ));
    }

    script.push_str(&format!(
        "Están en {}, un lugar moldeado por siglos de historia. {} es parte de su alma y un símbolo de su patrimonio.\n\n",
        t.city, t.name
    ));

    let closings = [
        format!("Gracias por visitar {}. Que esta experiencia los inspire a explorar más tesoros culturales del mundo.", t.name),
        format!("Al salir de {}, lleven consigo la sensación de asombro que este lugar encarna.", t.name),
        format!("Su visita a {} es ahora parte de su historia viviente. Gracias por su tiempo.", t.name),
    ];
    let closing_refs: Vec<&str> = closings.iter().map(String::as_str).collect();
    script.push_str(choose(&closing_refs, t.name));

    script
}
