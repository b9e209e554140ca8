//! Bilingual prompt catalog.
//!
//! Builds channel-agnostic `PromptSpec`s for every step. All user-visible
//! copy lives here; the orchestrator never embeds strings.

use crate::domain::foundation::Language;
use crate::domain::journey::StepId;
use crate::domain::offer::Offer;
use crate::domain::session::Session;
use crate::domain::validation::InvalidInput;
use crate::ports::PromptSpec;

/// Employment options: (option id, English, Hindi). The English label is
/// also the canonical answer value passed to the decision gateway.
pub const EMPLOYMENT_OPTIONS: &[(&str, &str, &str)] = &[
    ("emp_0", "Salaried", "नौकरीपेशा (Salaried)"),
    ("emp_1", "Self-Employed", "स्वरोज़गार (Self-Employed)"),
    ("emp_2", "Other", "अन्य (Other)"),
];

/// Loan purpose options: (option id, English, Hindi).
pub const PURPOSE_OPTIONS: &[(&str, &str, &str)] = &[
    ("purpose_0", "Personal", "Personal"),
    ("purpose_1", "Education", "Education"),
    ("purpose_2", "Medical", "Medical"),
    ("purpose_3", "Home", "Home"),
    ("purpose_4", "Travel", "Travel"),
    ("purpose_5", "Other", "Other"),
];

/// All user-visible copy for one language.
#[derive(Debug)]
pub struct LanguagePack {
    pub welcome: &'static str,
    pub language_prompt: &'static str,
    pub main_menu_intro: &'static str,
    pub get_loan: &'static str,
    pub support: &'static str,

    pub support_prompt: &'static str,
    pub support_closing: &'static str,
    pub support_no_answer: &'static str,
    pub support_handoff: &'static str,
    pub support_escalation_ack: &'static str,
    pub download_app: &'static str,
    pub download_app_text: &'static str,
    pub send_email: &'static str,
    pub send_email_text: &'static str,
    pub connect_agent: &'static str,

    pub ask_name: &'static str,
    pub name_required: &'static str,
    pub ask_dob: &'static str,
    pub invalid_dob: &'static str,
    pub future_dob: &'static str,
    pub age_window: &'static str,
    pub ask_employment: &'static str,
    pub ask_income: &'static str,
    pub invalid_number: &'static str,
    pub positive_amount: &'static str,
    pub ask_purpose: &'static str,
    pub ask_consent: &'static str,
    pub consent_yes: &'static str,
    pub consent_no: &'static str,
    pub consent_required: &'static str,

    pub decision_submit: &'static str,
    pub decision_rejected: &'static str,
    pub decision_approved_intro: &'static str,
    pub offers_prompt: &'static str,
    pub offer_accept: &'static str,
    pub offer_selected: &'static str,

    pub ask_kyc: &'static str,
    pub kyc_button: &'static str,
    pub kyc_completed: &'static str,
    pub ask_selfie: &'static str,
    pub selfie_received: &'static str,
    pub ask_bank: &'static str,
    pub invalid_bank: &'static str,
    pub bank_received: &'static str,
    pub nach_prompt: &'static str,
    pub nach_button: &'static str,
    pub nach_completed: &'static str,
    pub agreement_prompt: &'static str,
    pub agreement_sent: &'static str,
    pub agree: &'static str,
    pub not_agree: &'static str,
    pub agreement_signed: &'static str,
    pub agreement_declined: &'static str,
    pub final_approval: &'static str,
    pub final_reject: &'static str,

    pub post_menu_intro: &'static str,
    pub post_view: &'static str,
    pub post_statement: &'static str,
    pub post_repay: &'static str,
    pub repay_text: &'static str,
    pub statement_caption: &'static str,
    pub loan_details: &'static str,
    pub no_loan_details: &'static str,

    pub invalid_choice: &'static str,
    pub try_again: &'static str,
}

const EN: LanguagePack = LanguagePack {
    welcome: "👋 Welcome to Lendline — I am your personal loan assistant.",
    language_prompt: "Please choose your preferred language.",
    main_menu_intro: "Get a loan of up to ₹5,00,000 in under 5 minutes. What would you like to do?",
    get_loan: "Get Loan",
    support: "Support",

    support_prompt: "Tell me briefly how I can help, or choose an option below.",
    support_closing: "If you need further help, connect to an agent.",
    support_no_answer: "I couldn't find a precise answer. Would you like to connect to a specialist?",
    support_handoff: "Connecting you to a Lendline specialist now.",
    support_escalation_ack: "A specialist has been notified and will reach out shortly.",
    download_app: "Download App",
    download_app_text: "Download the Lendline app from the Play Store or App Store.",
    send_email: "Mail Us",
    send_email_text: "Drop us a line at care@lendline.example and we'll get back at the earliest.",
    connect_agent: "Connect to Agent",

    ask_name: "Please share your full name (as per PAN).",
    name_required: "Name cannot be empty.",
    ask_dob: "Please enter your date of birth in DD-MM-YYYY format\ne.g. 31-12-1995",
    invalid_dob: "Invalid date. Please provide it in DD-MM-YYYY format\ne.g. 31-12-1995",
    future_dob: "That date is in the future. Please check and try again.",
    age_window: "Applicants must be between {min} and {max} years old.",
    ask_employment: "Select your employment type.",
    ask_income: "What is your monthly income in INR?\nOnly enter numbers.",
    invalid_number: "Please enter numbers only (e.g. 45000).",
    positive_amount: "The amount must be greater than zero.",
    ask_purpose: "What will this loan help you with?",
    ask_consent: "I authorize Lendline to process my information and pull credit bureau records.",
    consent_yes: "Yes",
    consent_no: "No",
    consent_required: "Consent is required to proceed with credit evaluation.",

    decision_submit: "Processing your loan application...",
    decision_rejected: "We're sorry! Your profile was declined: {reason}. Please come back later.",
    decision_approved_intro: "🎉 You're eligible for a loan. Here are a few curated offers for you.",
    offers_prompt: "Select an offer to proceed, or type Support for help.",
    offer_accept: "Accept",
    offer_selected: "You selected:\n₹{amount}\n{tenure} months\nAPR {apr}%",

    ask_kyc: "Complete KYC to proceed. Tap Complete KYC.",
    kyc_button: "Complete KYC",
    kyc_completed: "KYC is successfully completed. Moving to the selfie now.",
    ask_selfie: "Please take a selfie using your camera and send it here.",
    selfie_received: "Looking good!",
    ask_bank: "Please provide bank details in the format:\n<IFSC>\n<account number>",
    invalid_bank: "That doesn't look right. Send the IFSC and account number on two lines.",
    bank_received: "Bank details received. Submitting your application.",
    nach_prompt: "Complete NACH (mandate) to enable auto-debit. Tap Complete NACH.",
    nach_button: "Complete NACH",
    nach_completed: "Auto-debit successfully set up.",
    agreement_prompt: "Please review and agree to the customer agreement to proceed.",
    agreement_sent: "Read the agreement carefully and tap Agree to sign and continue.",
    agree: "Agree",
    not_agree: "Not Agree",
    agreement_signed: "🎉 Congratulations! Everything's done; the amount will be credited to your account soon.",
    agreement_declined: "You did not agree to the terms, so the application cannot proceed.",
    final_approval: "✅ Loan approved!\nAmount: ₹{amount}\nReference: {ref}",
    final_reject: "We're unable to disburse the loan because: {reason}. Please contact Support.",

    post_menu_intro: "Choose an option",
    post_view: "View Loan Details",
    post_statement: "Download Loan Statement",
    post_repay: "Repay Loan",
    repay_text: "To repay, open the Lendline app or reply PAY LINK to get a payment link.",
    statement_caption: "Your loan statement is attached.",
    loan_details: "Loan details:\nAmount: ₹{amount}\nTenure: {tenure} months\nAPR: {apr}%\nReference: {ref}",
    no_loan_details: "I couldn't find an active loan on this number.",

    invalid_choice: "Please choose from the available options.",
    try_again: "Something went wrong on our side. Please try again in a moment.",
};

const HI: LanguagePack = LanguagePack {
    welcome: "👋 Lendline में आपका स्वागत है — आपका पर्सनल लोन असिस्टेंट।",
    language_prompt: "कृपया अपनी पसंदीदा भाषा चुनें।",
    main_menu_intro: "5 मिनट में ₹5,00,000 तक का लोन प्राप्त करें। आप क्या करना चाहेंगे?",
    get_loan: "लोन लें",
    support: "सपोर्ट",

    support_prompt: "कृपया बताएं कि आपको किस प्रकार मदद चाहिए, या नीचे से विकल्प चुनें।",
    support_closing: "यदि आपको और सहायता चाहिए तो एजेंट से कनेक्ट करें।",
    support_no_answer: "मुझे सटीक उत्तर नहीं मिला। क्या आप विशेषज्ञ से जुड़ना चाहेंगे?",
    support_handoff: "मैं आपको Lendline विशेषज्ञ से जोड़ रहा हूँ।",
    support_escalation_ack: "विशेषज्ञ को सूचित कर दिया गया है, वे जल्द ही संपर्क करेंगे।",
    download_app: "ऐप डाउनलोड करें",
    download_app_text: "Play Store या App Store से Lendline ऐप डाउनलोड करें।",
    send_email: "ईमेल भेजें",
    send_email_text: "हमें care@lendline.example पर लिखें, हम जल्द जवाब देंगे।",
    connect_agent: "एजेंट से कनेक्ट करें",

    ask_name: "कृपया अपना पूरा नाम लिखें (PAN के अनुसार)।",
    name_required: "नाम खाली नहीं हो सकता।",
    ask_dob: "कृपया अपनी जन्मतिथि DD-MM-YYYY फॉर्मेट में दें (उदा. 31-12-1995)।",
    invalid_dob: "अमान्य तिथि। कृपया DD-MM-YYYY फॉर्मेट में दें (उदा. 31-12-1995)।",
    future_dob: "यह तिथि भविष्य की है। कृपया जाँच कर फिर से भेजें।",
    age_window: "आवेदक की आयु {min} से {max} वर्ष के बीच होनी चाहिए।",
    ask_employment: "अपना रोजगार प्रकार चुनें।",
    ask_income: "कृपया अपनी मासिक आय ₹ में लिखें (सिर्फ अंक)।",
    invalid_number: "कृपया केवल संख्याएँ भेजें (उदा. 45000)।",
    positive_amount: "राशि शून्य से अधिक होनी चाहिए।",
    ask_purpose: "इस लोन का मुख्य उद्देश्य क्या है?",
    ask_consent: "क्या आप Lendline को अपने विवरण प्रोसेस करने और क्रेडिट ब्यूरो जाँच की सहमति देते हैं?",
    consent_yes: "हाँ",
    consent_no: "नहीं",
    consent_required: "आगे बढ़ने के लिए सहमति आवश्यक है।",

    decision_submit: "आपका लोन आवेदन प्रोसेस हो रहा है...",
    decision_rejected: "क्षमा करें — हम अभी लोन स्वीकृत नहीं कर पाए: {reason}। कृपया बाद में प्रयास करें।",
    decision_approved_intro: "🎉 आप लोन के पात्र हैं। आपके लिए कुछ चुनिंदा ऑफ़र नीचे हैं।",
    offers_prompt: "आगे बढ़ने के लिए कोई ऑफ़र चुनें, या मदद के लिए Support लिखें।",
    offer_accept: "स्वीकार करें",
    offer_selected: "आपने चुना:\n₹{amount}\n{tenure} महीने\nAPR {apr}%",

    ask_kyc: "आगे बढ़ने के लिए KYC पूरा करें। Complete KYC दबाएँ।",
    kyc_button: "Complete KYC",
    kyc_completed: "KYC पूरा हो गया। अब सेल्फ़ी की बारी है।",
    ask_selfie: "कृपया कैमरे से सेल्फ़ी लेकर यहाँ भेजें।",
    selfie_received: "सेल्फ़ी प्राप्त हो गई।",
    ask_bank: "कृपया बैंक विवरण इस फॉर्मेट में दें:\n<IFSC>\n<खाता संख्या>",
    invalid_bank: "विवरण सही नहीं लगा। IFSC और खाता संख्या दो पंक्तियों में भेजें।",
    bank_received: "बैंक विवरण प्राप्त। आवेदन जमा किया जा रहा है।",
    nach_prompt: "ऑटो-डेबिट के लिए NACH (मंडेट) पूरा करें। Complete NACH दबाएँ।",
    nach_button: "Complete NACH",
    nach_completed: "ऑटो-डेबिट सेट हो गया।",
    agreement_prompt: "कृपया ग्राहक समझौता पढ़ें और सहमति दें।",
    agreement_sent: "समझौता ध्यान से पढ़ें और साइन करने के लिए Agree दबाएँ।",
    agree: "Agree",
    not_agree: "Not Agree",
    agreement_signed: "🎉 बधाई! सब हो गया — राशि जल्द ही आपके खाते में जमा होगी।",
    agreement_declined: "आपने शर्तें स्वीकार नहीं कीं, इसलिए आवेदन आगे नहीं बढ़ सकता।",
    final_approval: "✅ लोन स्वीकृत!\nराशि: ₹{amount}\nसंदर्भ: {ref}",
    final_reject: "हम लोन जारी नहीं कर पा रहे हैं: {reason}। कृपया Support से संपर्क करें।",

    post_menu_intro: "एक विकल्प चुनें",
    post_view: "लोन विवरण देखें",
    post_statement: "लोन स्टेटमेंट डाउनलोड करें",
    post_repay: "लोन चुकाएँ",
    repay_text: "चुकाने के लिए Lendline ऐप खोलें या PAY LINK लिखकर भुगतान लिंक पाएँ।",
    statement_caption: "आपका लोन स्टेटमेंट संलग्न है।",
    loan_details: "लोन विवरण:\nराशि: ₹{amount}\nअवधि: {tenure} महीने\nAPR: {apr}%\nसंदर्भ: {ref}",
    no_loan_details: "इस नंबर पर कोई सक्रिय लोन नहीं मिला।",

    invalid_choice: "कृपया उपलब्ध विकल्पों में से चुनें।",
    try_again: "हमारी ओर से कुछ गड़बड़ हुई। कृपया थोड़ी देर में फिर प्रयास करें।",
};

/// Returns the pack for a language, falling back to English.
pub fn pack(language: Option<Language>) -> &'static LanguagePack {
    match language.unwrap_or(Language::En) {
        Language::En => &EN,
        Language::Hi => &HI,
    }
}

/// Formats a rupee amount with thousands separators.
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// The canonical (English) employment value for an option id.
pub fn employment_value(option_id: &str) -> Option<&'static str> {
    EMPLOYMENT_OPTIONS
        .iter()
        .find(|(id, _, _)| *id == option_id)
        .map(|(_, en, _)| *en)
}

/// The canonical (English) purpose value for an option id.
pub fn purpose_value(option_id: &str) -> Option<&'static str> {
    PURPOSE_OPTIONS
        .iter()
        .find(|(id, _, _)| *id == option_id)
        .map(|(_, en, _)| *en)
}

fn localized(options: &'static [(&str, &str, &str)], language: Language) -> Vec<(String, String)> {
    options
        .iter()
        .map(|(id, en, hi)| {
            let label = match language {
                Language::En => en,
                Language::Hi => hi,
            };
            (id.to_string(), label.to_string())
        })
        .collect()
}

/// The language selection prompt (always bilingual).
pub fn language_menu() -> PromptSpec {
    PromptSpec::choices(
        EN.language_prompt,
        vec![
            ("lang_en".to_string(), Language::En.label().to_string()),
            ("lang_hi".to_string(), Language::Hi.label().to_string()),
        ],
    )
}

/// The main menu (get a loan / support).
pub fn main_menu(language: Language) -> PromptSpec {
    let p = pack(Some(language));
    PromptSpec::choices(
        p.main_menu_intro,
        vec![
            ("intent_get_loan".to_string(), p.get_loan.to_string()),
            ("intent_support".to_string(), p.support.to_string()),
        ],
    )
}

/// The top-level menu shown when no journey is active: the welcome plus
/// language selection for first contact, the main menu afterwards.
pub fn top_level_menu(language: Option<Language>) -> Vec<PromptSpec> {
    match language {
        Some(lang) => vec![main_menu(lang)],
        None => vec![PromptSpec::text(EN.welcome), language_menu()],
    }
}

/// The support desk prompt.
pub fn support_menu(language: Language) -> PromptSpec {
    let p = pack(Some(language));
    PromptSpec::choices(
        p.support_prompt,
        vec![
            ("download_app".to_string(), p.download_app.to_string()),
            ("send_email".to_string(), p.send_email.to_string()),
            ("connect_agent".to_string(), p.connect_agent.to_string()),
        ],
    )
}

/// The closing shown after a support answer.
pub fn support_closing(language: Language) -> PromptSpec {
    let p = pack(Some(language));
    PromptSpec::choices(
        p.support_closing,
        vec![("connect_agent".to_string(), p.connect_agent.to_string())],
    )
}

/// The escalation offer when no answer was found.
pub fn escalation_offer(language: Language) -> PromptSpec {
    let p = pack(Some(language));
    PromptSpec::choices(
        p.support_no_answer,
        vec![
            ("connect_agent".to_string(), p.connect_agent.to_string()),
            ("send_email".to_string(), p.send_email.to_string()),
        ],
    )
}

/// The post-loan menu.
pub fn post_loan_menu(language: Language) -> PromptSpec {
    let p = pack(Some(language));
    PromptSpec::choices(
        p.post_menu_intro,
        vec![
            ("post_view".to_string(), p.post_view.to_string()),
            ("post_statement".to_string(), p.post_statement.to_string()),
            ("post_repay".to_string(), p.post_repay.to_string()),
            ("post_support".to_string(), p.support.to_string()),
        ],
    )
}

/// One combined message presenting the stored offers, with one accept
/// button per offer.
pub fn offers_presentation(offers: &[Offer], language: Language) -> Vec<PromptSpec> {
    let p = pack(Some(language));
    let mut lines = vec![p.decision_approved_intro.to_string(), String::new()];
    let mut buttons = Vec::new();
    for (idx, offer) in offers.iter().enumerate() {
        lines.push(format!(
            "⭐ Offer {n}\n• Amount: ₹{amount}\n• Tenure: {tenure} months\n• APR: {apr:.2}%\n• Processing fee: {fee:.2}%\n• EMI: ₹{emi}\n",
            n = idx + 1,
            amount = format_amount(offer.amount),
            tenure = offer.term_months,
            apr = offer.apr,
            fee = offer.processing_fee_pct,
            emi = format_amount(offer.monthly_emi),
        ));
        buttons.push((
            format!("offer_select_{idx}"),
            format!("{} {}", p.offer_accept, idx + 1),
        ));
    }
    vec![
        PromptSpec::choices(lines.join("\n").trim().to_string(), buttons),
        PromptSpec::text(p.offers_prompt),
    ]
}

/// Summary of the offer the user just selected.
pub fn offer_selected_summary(offer: &Offer, language: Language) -> PromptSpec {
    let p = pack(Some(language));
    PromptSpec::text(
        p.offer_selected
            .replace("{amount}", &format_amount(offer.amount))
            .replace("{tenure}", &offer.term_months.to_string())
            .replace("{apr}", &format!("{:.2}", offer.apr)),
    )
}

/// The prompt set for entering a step.
pub fn step_prompts(step: StepId, session: &Session) -> Vec<PromptSpec> {
    let language = session.language().unwrap_or_default();
    let p = pack(session.language());
    match step {
        StepId::LanguageSelect => vec![language_menu()],
        StepId::IntentConfirm => vec![main_menu(language)],
        StepId::FullName => vec![PromptSpec::text(p.ask_name)],
        StepId::DateOfBirth => vec![PromptSpec::text(p.ask_dob)],
        StepId::Employment => vec![PromptSpec::choices(
            p.ask_employment,
            localized(EMPLOYMENT_OPTIONS, language),
        )],
        StepId::MonthlyIncome => vec![PromptSpec::text(p.ask_income)],
        StepId::Purpose => vec![PromptSpec::choices(
            p.ask_purpose,
            localized(PURPOSE_OPTIONS, language),
        )],
        StepId::Consent => vec![PromptSpec::choices(
            p.ask_consent,
            vec![
                ("consent_yes".to_string(), p.consent_yes.to_string()),
                ("consent_no".to_string(), p.consent_no.to_string()),
            ],
        )],
        StepId::OfferSelection => offers_presentation(session.offers(), language),
        StepId::KycAck => vec![PromptSpec::choices(
            p.ask_kyc,
            vec![("kyc_complete".to_string(), p.kyc_button.to_string())],
        )],
        StepId::SelfieAck => vec![PromptSpec::text(p.ask_selfie)],
        StepId::BankDetails => vec![PromptSpec::text(p.ask_bank)],
        StepId::NachAck => vec![PromptSpec::choices(
            p.nach_prompt,
            vec![("nach_complete".to_string(), p.nach_button.to_string())],
        )],
        StepId::AgreementAck => vec![
            PromptSpec::document(p.agreement_prompt),
            PromptSpec::choices(
                p.agreement_sent,
                vec![
                    ("agree_yes".to_string(), p.agree.to_string()),
                    ("agree_no".to_string(), p.not_agree.to_string()),
                ],
            ),
        ],
        // Side-effect step; its messaging comes from the decision outcome.
        StepId::FinalDecision => Vec::new(),
        StepId::SupportDesk => vec![support_menu(language)],
        StepId::PostLoanMenu => vec![post_loan_menu(language)],
    }
}

/// The currently valid options for a choice step.
pub fn options_for(step: StepId, session: &Session) -> Vec<(String, String)> {
    let language = session.language().unwrap_or_default();
    let p = pack(session.language());
    match step {
        StepId::LanguageSelect => vec![
            ("lang_en".to_string(), Language::En.label().to_string()),
            ("lang_hi".to_string(), Language::Hi.label().to_string()),
        ],
        StepId::IntentConfirm => vec![
            ("intent_get_loan".to_string(), p.get_loan.to_string()),
            ("intent_support".to_string(), p.support.to_string()),
        ],
        StepId::Employment => localized(EMPLOYMENT_OPTIONS, language),
        StepId::Purpose => localized(PURPOSE_OPTIONS, language),
        StepId::OfferSelection => session
            .offers()
            .iter()
            .enumerate()
            .map(|(idx, _)| {
                (
                    format!("offer_select_{idx}"),
                    format!("{} {}", p.offer_accept, idx + 1),
                )
            })
            .collect(),
        StepId::KycAck => vec![("kyc_complete".to_string(), p.kyc_button.to_string())],
        StepId::NachAck => vec![("nach_complete".to_string(), p.nach_button.to_string())],
        StepId::AgreementAck => vec![
            ("agree_yes".to_string(), p.agree.to_string()),
            ("agree_no".to_string(), p.not_agree.to_string()),
        ],
        StepId::PostLoanMenu => vec![
            ("post_view".to_string(), p.post_view.to_string()),
            ("post_statement".to_string(), p.post_statement.to_string()),
            ("post_repay".to_string(), p.post_repay.to_string()),
            ("post_support".to_string(), p.support.to_string()),
        ],
        _ => Vec::new(),
    }
}

/// A short localized hint for a rejected input.
pub fn invalid_hint(
    step: StepId,
    reason: &InvalidInput,
    language: Option<Language>,
    min_age: u32,
    max_age: u32,
) -> PromptSpec {
    let p = pack(language);
    let body = match (step, reason) {
        (StepId::FullName, InvalidInput::Empty) => p.name_required.to_string(),
        (_, InvalidInput::Unparseable) => p.invalid_dob.to_string(),
        (_, InvalidInput::FutureDate) => p.future_dob.to_string(),
        (_, InvalidInput::Underage { .. }) | (_, InvalidInput::Overage { .. }) => p
            .age_window
            .replace("{min}", &min_age.to_string())
            .replace("{max}", &max_age.to_string()),
        (_, InvalidInput::NotNumeric) => p.invalid_number.to_string(),
        (_, InvalidInput::NonPositive) => p.positive_amount.to_string(),
        (_, InvalidInput::Ambiguous) => p.consent_required.to_string(),
        (_, InvalidInput::UnknownOption) => p.invalid_choice.to_string(),
        _ => p.invalid_choice.to_string(),
    };
    PromptSpec::text(body)
}

/// Renders the stored loan details, if a loan has been disbursed.
pub fn loan_details(session: &Session, language: Language) -> PromptSpec {
    let p = pack(Some(language));
    match session.chosen_offer() {
        Some((_, offer)) if session.flag("loan_disbursed") => {
            let reference = session.disbursement_reference().unwrap_or("-");
            PromptSpec::text(
                p.loan_details
                    .replace("{amount}", &format_amount(offer.amount))
                    .replace("{tenure}", &offer.term_months.to_string())
                    .replace("{apr}", &format!("{:.2}", offer.apr))
                    .replace("{ref}", reference),
            )
        }
        _ => PromptSpec::text(p.no_loan_details),
    }
}
