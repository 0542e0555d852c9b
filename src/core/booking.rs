//! Booking wizard.
//!
//! The selection is a strict chain: date, then time, then service model, then
//! payment method. Choosing a link again clears every link after it. All
//! transitions go through [`BookingSelection::reduce`].

use crate::core::catalog::ServiceModel;
use chrono::{Datelike, Months, NaiveDate};
use url::Url;

pub const TIME_SLOTS: &[&str] = &["09:00", "11:00", "14:00", "16:30", "18:00"];

pub const STUDIO_WHATSAPP_PHONE: &str = "5513997002356";

const WEEKDAY_NAMES: [&str; 7] = [
    "segunda-feira",
    "terça-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sábado",
    "domingo",
];

const MONTH_NAMES: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

pub const WEEKDAY_HEADERS: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Pix,
    Credit,
    Debit,
    Cash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Pix,
        PaymentMethod::Credit,
        PaymentMethod::Debit,
        PaymentMethod::Cash,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Credit => "credito",
            PaymentMethod::Debit => "debito",
            PaymentMethod::Cash => "dinheiro",
        }
    }

    /// Looks a method up by the identifier the client sends.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.id() == id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Credit => "Crédito",
            PaymentMethod::Debit => "Débito",
            PaymentMethod::Cash => "Dinheiro",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    SelectDate(NaiveDate),
    SelectTime(String),
    SelectModel(ServiceModel),
    SelectPayment(PaymentMethod),
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStage {
    NoDate,
    DateChosen,
    TimeChosen,
    ModelChosen,
    Ready,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingSelection {
    date: Option<NaiveDate>,
    time: Option<String>,
    service_model: Option<ServiceModel>,
    payment_method: Option<PaymentMethod>,
}

impl BookingSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub fn service_model(&self) -> Option<&ServiceModel> {
        self.service_model.as_ref()
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// Applies one user selection. Selections whose predecessor is missing,
    /// or whose value is not on offer, leave the state untouched.
    pub fn reduce(self, action: BookingAction) -> Self {
        match action {
            BookingAction::SelectDate(date) => Self {
                date: Some(date),
                ..Self::default()
            },
            BookingAction::SelectTime(time) => {
                if self.date.is_none() || !TIME_SLOTS.contains(&time.as_str()) {
                    return self;
                }
                Self {
                    time: Some(time),
                    service_model: None,
                    payment_method: None,
                    ..self
                }
            }
            BookingAction::SelectModel(model) => {
                if self.time.is_none() || !model.is_bookable() {
                    return self;
                }
                Self {
                    service_model: Some(model),
                    payment_method: None,
                    ..self
                }
            }
            BookingAction::SelectPayment(method) => {
                if self.service_model.is_none() {
                    return self;
                }
                Self {
                    payment_method: Some(method),
                    ..self
                }
            }
            BookingAction::Reset => Self::default(),
        }
    }

    pub fn stage(&self) -> BookingStage {
        match (
            &self.date,
            &self.time,
            &self.service_model,
            &self.payment_method,
        ) {
            (Some(_), Some(_), Some(_), Some(_)) => BookingStage::Ready,
            (Some(_), Some(_), Some(_), None) => BookingStage::ModelChosen,
            (Some(_), Some(_), None, _) => BookingStage::TimeChosen,
            (Some(_), None, _, _) => BookingStage::DateChosen,
            (None, _, _, _) => BookingStage::NoDate,
        }
    }

    pub fn can_confirm(&self) -> bool {
        self.date.is_some()
            && self.time.is_some()
            && self.service_model.is_some()
            && self.payment_method.is_some()
    }

    /// Builds the hand-off message, or `None` while anything is unselected.
    pub fn confirm(&self, phone: &str) -> Option<BookingConfirmation> {
        let (Some(date), Some(time), Some(model), Some(payment)) = (
            self.date,
            self.time.as_deref(),
            self.service_model.as_ref(),
            self.payment_method,
        ) else {
            return None;
        };

        let message = format!(
            "Olá Rebecca, gostaria de confirmar um agendamento:\n\n*Modelo:* {}\n*Dia:* {}\n*Horário:* {}\n*Pagamento:* {}",
            model.name,
            format_long_date(date),
            time,
            payment.label()
        );
        let deep_link = whatsapp_link(phone, &message)?;

        Some(BookingConfirmation { message, deep_link })
    }
}

/// The formatted summary and the messaging link that carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmation {
    pub message: String,
    pub deep_link: Url,
}

fn whatsapp_link(phone: &str, text: &str) -> Option<Url> {
    let mut link = Url::parse("https://wa.me/").ok()?.join(phone).ok()?;
    link.query_pairs_mut().append_pair("text", text);
    Some(link)
}

/// `segunda-feira, 19 de outubro`
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{}, {} de {}",
        WEEKDAY_NAMES[date.weekday().num_days_from_monday() as usize],
        date.day(),
        MONTH_NAMES[date.month0() as usize]
    )
}

/// A month page of the booking calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonth {
    first_day: NaiveDate,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn previous(&self) -> Self {
        self.first_day
            .checked_sub_months(Months::new(1))
            .map(|first_day| Self { first_day })
            .unwrap_or(*self)
    }

    pub fn next(&self) -> Self {
        self.first_day
            .checked_add_months(Months::new(1))
            .map(|first_day| Self { first_day })
            .unwrap_or(*self)
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next().first_day;
        if next == self.first_day {
            // December of the last representable year
            return 31;
        }
        next.signed_duration_since(self.first_day).num_days() as u32
    }

    /// Empty cells before day 1 in a Sunday-first week grid.
    pub fn leading_blanks(&self) -> u32 {
        self.first_day.weekday().num_days_from_sunday()
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        self.first_day.with_day(day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// `Outubro de 2026`
    pub fn label(&self) -> String {
        let month = MONTH_NAMES[self.first_day.month0() as usize];
        let mut chars = month.chars();
        let capitalized: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("{} de {}", capitalized, self.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::fallback_models;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn model(id: &str) -> ServiceModel {
        fallback_models().into_iter().find(|m| m.id == id).unwrap()
    }

    fn ready_selection() -> BookingSelection {
        BookingSelection::new()
            .reduce(BookingAction::SelectDate(date(19)))
            .reduce(BookingAction::SelectTime("14:00".into()))
            .reduce(BookingAction::SelectModel(model("fox_eyes")))
            .reduce(BookingAction::SelectPayment(PaymentMethod::Pix))
    }

    #[test]
    fn test_forward_selection_reaches_ready() {
        let selection = ready_selection();

        assert_eq!(selection.stage(), BookingStage::Ready);
        assert!(selection.can_confirm());
    }

    #[test]
    fn test_new_date_clears_everything_after_it() {
        let selection = ready_selection().reduce(BookingAction::SelectDate(date(20)));

        assert_eq!(selection.date(), Some(date(20)));
        assert_eq!(selection.time(), None);
        assert_eq!(selection.service_model(), None);
        assert_eq!(selection.payment_method(), None);
        assert_eq!(selection.stage(), BookingStage::DateChosen);
    }

    #[test]
    fn test_new_time_keeps_date_and_clears_model_and_payment() {
        let selection = ready_selection().reduce(BookingAction::SelectTime("09:00".into()));

        assert_eq!(selection.date(), Some(date(19)));
        assert_eq!(selection.time(), Some("09:00"));
        assert_eq!(selection.service_model(), None);
        assert_eq!(selection.payment_method(), None);
    }

    #[test]
    fn test_new_model_clears_payment_only() {
        let selection = ready_selection().reduce(BookingAction::SelectModel(model("capping")));

        assert_eq!(selection.time(), Some("14:00"));
        assert_eq!(selection.service_model().unwrap().id, "capping");
        assert_eq!(selection.payment_method(), None);
        assert_eq!(selection.stage(), BookingStage::ModelChosen);
    }

    #[test]
    fn test_out_of_order_selections_are_ignored() {
        let empty = BookingSelection::new();

        assert_eq!(
            empty.clone().reduce(BookingAction::SelectTime("09:00".into())),
            empty
        );
        assert_eq!(
            empty
                .clone()
                .reduce(BookingAction::SelectPayment(PaymentMethod::Cash)),
            empty
        );

        let dated = empty.reduce(BookingAction::SelectDate(date(19)));
        assert_eq!(
            dated
                .clone()
                .reduce(BookingAction::SelectModel(model("capping"))),
            dated
        );
        assert_eq!(
            dated.clone().reduce(BookingAction::SelectTime("10:15".into())),
            dated
        );
    }

    #[test]
    fn test_unpriced_model_cannot_be_booked() {
        let mut free = model("capping");
        free.price = 0.0;
        let timed = BookingSelection::new()
            .reduce(BookingAction::SelectDate(date(19)))
            .reduce(BookingAction::SelectTime("11:00".into()));

        assert_eq!(timed.clone().reduce(BookingAction::SelectModel(free)), timed);
    }

    #[test]
    fn test_confirm_enabled_only_when_all_four_are_set() {
        let mut enabled = 0;
        for mask in 0u8..16 {
            let selection = BookingSelection {
                date: (mask & 1 != 0).then(|| date(19)),
                time: (mask & 2 != 0).then(|| "14:00".to_owned()),
                service_model: (mask & 4 != 0).then(|| model("fox_eyes")),
                payment_method: (mask & 8 != 0).then_some(PaymentMethod::Debit),
            };

            if mask == 15 {
                assert!(selection.can_confirm());
                assert!(selection.confirm(STUDIO_WHATSAPP_PHONE).is_some());
                enabled += 1;
            } else {
                assert!(!selection.can_confirm(), "mask {mask:04b} enabled confirm");
                assert!(selection.confirm(STUDIO_WHATSAPP_PHONE).is_none());
            }
        }
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_confirmation_message_and_link() {
        let confirmation = ready_selection().confirm(STUDIO_WHATSAPP_PHONE).unwrap();

        assert_eq!(
            confirmation.message,
            "Olá Rebecca, gostaria de confirmar um agendamento:\n\n*Modelo:* Fox Eyes\n*Dia:* segunda-feira, 19 de outubro\n*Horário:* 14:00\n*Pagamento:* PIX"
        );
        assert_eq!(confirmation.deep_link.host_str(), Some("wa.me"));
        assert_eq!(confirmation.deep_link.path(), "/5513997002356");

        let text = confirmation
            .deep_link
            .query_pairs()
            .find(|(key, _)| key == "text")
            .map(|(_, value)| value.into_owned());
        assert_eq!(text.as_deref(), Some(confirmation.message.as_str()));
    }

    #[test]
    fn test_payment_methods_by_id() {
        for method in PaymentMethod::ALL {
            assert_eq!(PaymentMethod::from_id(method.id()), Some(method));
        }
        assert_eq!(PaymentMethod::from_id("boleto"), None);

        let labels: Vec<&str> = PaymentMethod::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["PIX", "Crédito", "Débito", "Dinheiro"]);
    }

    #[test]
    fn test_reset_clears_selection() {
        let selection = ready_selection().reduce(BookingAction::Reset);
        assert_eq!(selection.stage(), BookingStage::NoDate);
    }

    #[test]
    fn test_calendar_month_grid() {
        let october = CalendarMonth::new(2026, 10).unwrap();

        assert_eq!(october.days_in_month(), 31);
        // 1 October 2026 is a Thursday
        assert_eq!(october.leading_blanks(), 4);
        assert_eq!(WEEKDAY_HEADERS[october.leading_blanks() as usize], "Qui");
        assert_eq!(october.label(), "Outubro de 2026");
        assert_eq!(october.day(19), Some(date(19)));
        assert_eq!(october.day(32), None);
        assert!(october.contains(date(1)));
    }

    #[test]
    fn test_calendar_navigation_wraps_years() {
        let january = CalendarMonth::new(2027, 1).unwrap();

        assert_eq!(january.previous(), CalendarMonth::new(2026, 12).unwrap());
        assert_eq!(january.previous().next(), january);
        assert_eq!(CalendarMonth::new(2028, 2).unwrap().days_in_month(), 29);
        assert_eq!(CalendarMonth::containing(date(19)).month(), 10);
    }
}
