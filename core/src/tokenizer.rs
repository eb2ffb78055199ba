use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{Alphabetic}\p{N}]+").expect("valid regex");
    static ref PORTUGUESE: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","à","ao","aos","aquela","aquelas","aquele","aqueles","aquilo","as","às","até",
            "com","como",
            "da","das","de","dela","delas","dele","deles","depois","do","dos",
            "e","é","ela","elas","ele","eles","em","entre","era","eram","éramos","essa","essas","esse","esses",
            "esta","está","estamos","estão","estar","estas","estava","estavam","estávamos","este","esteja",
            "estejam","estejamos","estes","esteve","estive","estivemos","estiver","estivera","estiveram",
            "estivéramos","estiverem","estivermos","estivesse","estivessem","estivéssemos","estou","eu",
            "foi","fomos","for","fora","foram","fôramos","forem","formos","fosse","fossem","fôssemos","fui",
            "há","haja","hajam","hajamos","hão","havemos","haver","hei","houve","houvemos","houver","houvera",
            "houverá","houveram","houvéramos","houverão","houverei","houverem","houveremos","houveria",
            "houveriam","houveríamos","houvermos","houvesse","houvessem","houvéssemos",
            "isso","isto","já","lhe","lhes",
            "mais","mas","me","mesmo","meu","meus","minha","minhas","muito",
            "na","não","nas","nem","no","nos","nós","nossa","nossas","nosso","nossos","num","numa",
            "o","os","ou",
            "para","pela","pelas","pelo","pelos","por",
            "qual","quando","que","quem",
            "são","se","seja","sejam","sejamos","sem","ser","será","serão","serei","seremos","seria","seriam",
            "seríamos","seu","seus","só","somos","sou","sua","suas",
            "também","te","tem","tém","temos","tenha","tenham","tenhamos","tenho","terá","terão","terei",
            "teremos","teria","teriam","teríamos","teu","teus","teve","tinha","tinham","tínhamos","tive",
            "tivemos","tiver","tivera","tiveram","tivéramos","tiverem","tivermos","tivesse","tivessem",
            "tivéssemos","tu","tua","tuas",
            "um","uma","você","vocês","vos"
        ];
        words.iter().copied().collect()
    };
    static ref ENGLISH: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Language whose stop-word list is removed during tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopWordLanguage {
    #[default]
    Portuguese,
    English,
}

impl StopWordLanguage {
    pub fn stop_words(self) -> &'static HashSet<&'static str> {
        match self {
            StopWordLanguage::Portuguese => &PORTUGUESE,
            StopWordLanguage::English => &ENGLISH,
        }
    }

    pub fn is_stop_word(self, token: &str) -> bool {
        self.stop_words().contains(token)
    }
}

impl fmt::Display for StopWordLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopWordLanguage::Portuguese => f.write_str("portuguese"),
            StopWordLanguage::English => f.write_str("english"),
        }
    }
}

impl FromStr for StopWordLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "portuguese" | "pt" => Ok(StopWordLanguage::Portuguese),
            "english" | "en" => Ok(StopWordLanguage::English),
            other => Err(format!("unsupported stop-word language: {other}")),
        }
    }
}

/// Tokenize text using NFC composition, lowercase, and stop-word removal.
///
/// Tokens are runs of alphanumeric characters at least two characters long.
/// Diacritics are kept as-is. Index build and query projection must both go
/// through this function.
pub fn tokenize(text: &str, language: StopWordLanguage) -> Vec<String> {
    let normalized = text.nfc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !language.is_stop_word(token))
        .map(str::to_string)
        .collect()
}
