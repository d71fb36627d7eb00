/// A completion that can happen many times.
///
/// `ready` subscribers hear every completion; `once` subscribers hear the next
/// one. Subscribing after a completion fires immediately with the last value.
pub struct ReadySignal<T> {
    latest: Option<T>,
    persistent: Vec<Box<dyn FnMut(&T)>>,
    one_shot: Vec<Box<dyn FnOnce(&T)>>,
}

impl<T> Default for ReadySignal<T> {
    fn default() -> Self {
        Self {
            latest: None,
            persistent: Vec::new(),
            one_shot: Vec::new(),
        }
    }
}

impl<T> ReadySignal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(&mut self, mut callback: impl FnMut(&T) + 'static) {
        if let Some(value) = &self.latest {
            callback(value);
        }
        self.persistent.push(Box::new(callback));
    }

    pub fn once(&mut self, callback: impl FnOnce(&T) + 'static) {
        match &self.latest {
            Some(value) => callback(value),
            None => self.one_shot.push(Box::new(callback)),
        }
    }

    pub fn complete(&mut self, value: T) {
        for callback in &mut self.persistent {
            callback(&value);
        }
        for callback in self.one_shot.drain(..) {
            callback(&value);
        }
        self.latest = Some(value);
    }

    pub fn is_complete(&self) -> bool {
        self.latest.is_some()
    }

    pub fn latest(&self) -> Option<&T> {
        self.latest.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn FnMut(&String)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |tag: &str| {
            let sink = sink.clone();
            let tag = tag.to_string();
            Box::new(move |v: &String| sink.borrow_mut().push(format!("{tag}:{v}")))
                as Box<dyn FnMut(&String)>
        };
        (log, make)
    }

    #[test]
    fn persistent_subscribers_hear_every_completion() {
        let (log, make) = recorder();
        let mut signal: ReadySignal<String> = ReadySignal::new();
        signal.ready(make("a"));

        signal.complete("en".to_string());
        signal.complete("fr".to_string());

        assert_eq!(*log.borrow(), vec!["a:en", "a:fr"]);
    }

    #[test]
    fn one_shot_subscribers_hear_the_next_completion_only() {
        let (log, make) = recorder();
        let mut signal: ReadySignal<String> = ReadySignal::new();
        let mut cb = make("once");
        signal.once(move |v| cb(v));

        signal.complete("en".to_string());
        signal.complete("fr".to_string());

        assert_eq!(*log.borrow(), vec!["once:en"]);
    }

    #[test]
    fn late_subscribers_fire_synchronously() {
        let (log, make) = recorder();
        let mut signal: ReadySignal<String> = ReadySignal::new();
        signal.complete("en".to_string());

        let mut cb = make("once");
        signal.once(move |v| cb(v));
        signal.ready(make("ready"));
        assert_eq!(*log.borrow(), vec!["once:en", "ready:en"]);

        signal.complete("ar".to_string());
        assert_eq!(*log.borrow(), vec!["once:en", "ready:en", "ready:ar"]);
        assert_eq!(signal.latest().map(String::as_str), Some("ar"));
    }
}
